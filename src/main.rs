use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;

use gather::config::Config;
use gather::fetch::Client;
use gather::repo::FeedRepository;
use gather::store::Store;
use gather::sync::{StagingArea, SyncEngine};
use gather::util::validate_feed_url;
use gather::consumer;

/// Get the config directory path (~/.config/gather/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home).join(".config").join("gather"))
}

#[derive(Parser, Debug)]
#[command(name = "gather", about = "Background RSS/Atom feed synchronizer")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// SQLite store path (overrides the config file)
    #[arg(long, value_name = "FILE")]
    db: Option<String>,

    /// Add or update a feed definition, then exit (requires --url)
    #[arg(long, value_name = "NAME")]
    add_feed: Option<String>,

    /// Source URL for --add-feed
    #[arg(long, value_name = "URL")]
    url: Option<String>,

    /// Minimum retrieval interval in hours for --add-feed
    #[arg(long, default_value_t = 1)]
    limit_hours: i64,

    /// Retention window in days for --add-feed
    #[arg(long, default_value_t = 45)]
    retention_days: i64,

    /// Remove a feed definition and its headlines, then exit
    #[arg(long, value_name = "NAME")]
    remove_feed: Option<String>,

    /// List configured feeds, then exit
    #[arg(long)]
    list_feeds: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config_path = match args.config {
        Some(path) => path,
        None => get_config_dir()?.join("config.toml"),
    };
    let config = Config::load(&config_path)?;
    let store_path = args.db.unwrap_or_else(|| config.store_path.clone());

    // An unopenable store is the one fatal condition: the engine must never
    // enter its polling loop without a valid handle.
    let store = match Store::open(&store_path).await {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    let repo = FeedRepository::new(store.clone());
    repo.ensure_schema().await;

    if let Some(name) = args.add_feed.as_deref() {
        let url_arg = args.url.as_deref().context("--add-feed requires --url")?;
        let url = validate_feed_url(url_arg)?;
        repo.set_feed(name, url.as_str(), args.limit_hours, args.retention_days)
            .await;
        println!("Feed '{name}' saved.");
        store.close().await;
        return Ok(());
    }

    if let Some(name) = args.remove_feed.as_deref() {
        repo.remove_feed(name).await;
        println!("Feed '{name}' removed.");
        store.close().await;
        return Ok(());
    }

    if args.list_feeds {
        let feeds = repo.list_feeds().await;
        if feeds.is_empty() {
            println!("No feeds configured. Add one with --add-feed NAME --url URL.");
        }
        for feed in feeds {
            let retrieved = if feed.last_retrieved.is_empty() {
                "never"
            } else {
                feed.last_retrieved.as_str()
            };
            println!(
                "{}\t{}\t{} headlines\tlast retrieved {}",
                feed.feed_name, feed.feed_url, feed.article_count, retrieved
            );
        }
        store.close().await;
        return Ok(());
    }

    let staging = StagingArea::new();
    let (engine, handle) = SyncEngine::new(repo.clone(), Client::new(), staging.clone(), &config);
    let engine_task = tokio::spawn(engine.run());
    handle.start().await;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let consumer_task = tokio::spawn(consumer::run(
        repo.clone(),
        staging,
        Duration::from_secs(config.consumer_interval_secs.max(1)),
        shutdown_rx,
    ));

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;
    tracing::info!("shutdown requested");

    handle.stop().await;
    let _ = shutdown_tx.send(true);
    let _ = engine_task.await;
    let _ = consumer_task.await;
    store.close().await;

    println!("Goodbye!");
    Ok(())
}
