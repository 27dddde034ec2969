use chrono::Utc;

use super::types::Feed;
use super::FeedRepository;

const FEED_COLUMNS: &str = "rowid, feed_name, feed_url, last_retrieved, \
     retrieve_limit_hrs, retention_days, \
     (SELECT COUNT(*) FROM headlines WHERE headlines.feed_name = feeds.feed_name) AS article_count";

impl FeedRepository {
    /// All feed definitions in listing order. The engine iterates feeds in
    /// exactly this order within a cycle.
    pub async fn list_feeds(&self) -> Vec<Feed> {
        let sql = format!("SELECT {FEED_COLUMNS} FROM feeds ORDER BY feed_name");
        let rows = self.store.execute(&sql, &[]).await;
        rows.iter().map(Feed::from_row).collect()
    }

    /// The named feed, or a default snapshot when absent. Absence is not
    /// an error.
    pub async fn get_feed(&self, feed_name: &str) -> Feed {
        let sql = format!("SELECT {FEED_COLUMNS} FROM feeds WHERE feed_name = ?");
        let rows = self.store.execute(&sql, &[feed_name]).await;
        rows.first().map(Feed::from_row).unwrap_or_default()
    }

    /// Lookup by row id, for callers that observed a rename and only hold
    /// the row identity.
    pub async fn get_feed_by_row_id(&self, row_id: i64) -> Feed {
        let sql = format!("SELECT {FEED_COLUMNS} FROM feeds WHERE rowid = ?");
        let id = row_id.to_string();
        let rows = self.store.execute(&sql, &[&id]).await;
        rows.first().map(Feed::from_row).unwrap_or_default()
    }

    /// True when the named feed's minimum retrieval interval has not yet
    /// elapsed. With `expiry_enabled` off, freshness is never asserted and
    /// retrieval attempts are limited only by the engine's own backoff.
    pub async fn is_feed_fresh(&self, feed_name: &str, expiry_enabled: bool) -> bool {
        if !expiry_enabled {
            return false;
        }
        self.get_feed(feed_name).await.is_fresh_at(Utc::now())
    }

    /// Inserts or updates a feed definition. The management surface; the
    /// engine is expected to be paused while a batch of these runs.
    pub async fn set_feed(
        &self,
        feed_name: &str,
        feed_url: &str,
        retrieve_limit_hrs: i64,
        retention_days: i64,
    ) {
        let limit = retrieve_limit_hrs.to_string();
        let retention = retention_days.to_string();
        self.store
            .execute(
                "INSERT INTO feeds (feed_name, feed_url, retrieve_limit_hrs, retention_days) \
                 VALUES (?, ?, ?, ?) \
                 ON CONFLICT (feed_name) DO UPDATE SET \
                    feed_url = excluded.feed_url, \
                    retrieve_limit_hrs = excluded.retrieve_limit_hrs, \
                    retention_days = excluded.retention_days",
                &[feed_name, feed_url, &limit, &retention],
            )
            .await;
    }

    /// Removes a feed definition and its headline records.
    pub async fn remove_feed(&self, feed_name: &str) {
        self.store
            .execute("DELETE FROM headlines WHERE feed_name = ?", &[feed_name])
            .await;
        self.store
            .execute("DELETE FROM feeds WHERE feed_name = ?", &[feed_name])
            .await;
    }
}
