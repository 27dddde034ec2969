//! Consumer loop: reflects newly synchronized data outside the engine.
//!
//! Polls the staging area on its own timer, drains whatever the engine
//! published, and reports each staged feed's new headlines together with
//! repository metadata. Runs independently of the engine; correctness
//! depends only on eventual re-polling, never on wake-up latency.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::repo::FeedRepository;
use crate::sync::StagingArea;

pub async fn run(
    repo: FeedRepository,
    staging: Arc<StagingArea>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    // Per-feed cursor over surfaced headlines. A staged update resets it to
    // the snapshot's "unseen" marker before the new batch is walked.
    let mut cursors: HashMap<String, i64> = HashMap::new();

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(interval) => {}
        }

        if !staging.has_pending() {
            continue;
        }

        for feed_name in staging.pending_feeds() {
            let Some(update) = staging.drain(&feed_name) else {
                continue;
            };

            let cursor = cursors.entry(feed_name.clone()).or_insert(-1);
            *cursor = update.feed.last_index;

            for headline in &update.headlines {
                *cursor += 1;
                tracing::info!(
                    feed = %feed_name,
                    headline = %headline.headline,
                    date = %headline.article_date,
                    "new headline"
                );
            }

            let total = repo.get_headline_count(&feed_name).await;
            tracing::info!(
                feed = %feed_name,
                new = update.headlines.len(),
                surfaced = *cursor + 1,
                total,
                last_retrieved = %update.feed.last_retrieved,
                "feed updated"
            );
        }
    }

    tracing::debug!("consumer loop stopped");
}
