//! Feed repository: query and translation logic over the store.
//!
//! Reads feed definitions and headline records, reports freshness, detects
//! per-feed change, and performs retention pruning. No timing decisions live
//! here; the engine decides *when* to call.

mod feeds;
mod headlines;
mod types;

pub use types::{Feed, Headline};

use crate::store::Store;

#[derive(Clone)]
pub struct FeedRepository {
    pub(crate) store: Store,
}

impl FeedRepository {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Creates the feed and headline tables when missing. Idempotent.
    pub async fn ensure_schema(&self) {
        self.store
            .execute_no_result(
                "CREATE TABLE IF NOT EXISTS feeds (\
                    feed_name TEXT NOT NULL UNIQUE, \
                    feed_url TEXT NOT NULL, \
                    last_retrieved TEXT NOT NULL DEFAULT '', \
                    retrieve_limit_hrs TEXT NOT NULL DEFAULT '1', \
                    retention_days TEXT NOT NULL DEFAULT '45')",
            )
            .await;
        self.store
            .execute_no_result(
                "CREATE TABLE IF NOT EXISTS headlines (\
                    feed_name TEXT NOT NULL, \
                    headline_text TEXT NOT NULL, \
                    article_date TEXT NOT NULL DEFAULT '', \
                    article_summary TEXT NOT NULL DEFAULT '', \
                    article_text TEXT NOT NULL DEFAULT '', \
                    article_url TEXT NOT NULL DEFAULT '', \
                    UNIQUE (feed_name, headline_text))",
            )
            .await;
        self.store
            .execute_no_result(
                "CREATE INDEX IF NOT EXISTS idx_headlines_feed ON headlines (feed_name)",
            )
            .await;
    }
}
