//! Fetch client: retrieve a feed over HTTP and produce headline records.
//!
//! The engine treats this as a thin collaborator: one call per attempt,
//! uniform success/failure by transport status, no per-code branching.

mod client;
mod parser;

pub use client::{Client, FetchOutcome, TransportStatus};
pub use parser::parse_headlines;

use crate::repo::{Feed, FeedRepository};

/// One fetch-and-persist attempt for a feed: the engine's retry unit.
///
/// On transport success the parsed headlines are handed to the repository
/// (store new records, prune past retention, stamp the retrieval instant).
/// On failure nothing is persisted. The outcome carries the headlines
/// retrieved in this attempt for staging.
pub async fn refresh_feed(repo: &FeedRepository, client: &Client, feed: &Feed) -> FetchOutcome {
    let mut outcome = client.fetch(&feed.feed_url).await;
    for headline in &mut outcome.headlines {
        headline.feed_name = feed.feed_name.clone();
    }

    if outcome.status.is_success() {
        let stored = repo
            .apply_fetch_result(&feed.feed_name, &outcome.headlines, feed.retention_days)
            .await;
        tracing::debug!(
            feed = %feed.feed_name,
            retrieved = outcome.headlines.len(),
            stored,
            "feed refreshed"
        );
    }

    outcome
}
