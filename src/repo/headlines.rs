use chrono::{Duration, Utc};

use super::types::Headline;
use super::FeedRepository;
use crate::util::{format_timestamp, now_timestamp};

impl FeedRepository {
    /// Headlines for a feed in storage order, optionally restricted to rows
    /// past a previously observed row-id high-water mark (the consumer's
    /// "how much have I surfaced" cursor).
    pub async fn get_headlines(
        &self,
        feed_name: &str,
        newer_than_row_id: Option<i64>,
    ) -> Vec<Headline> {
        let marker = newer_than_row_id.unwrap_or(-1).to_string();
        let rows = self
            .store
            .execute(
                "SELECT rowid, feed_name, headline_text, article_date, \
                        article_summary, article_text, article_url \
                 FROM headlines WHERE feed_name = ? AND rowid > ? \
                 ORDER BY rowid",
                &[feed_name, &marker],
            )
            .await;
        rows.iter().map(Headline::from_row).collect()
    }

    pub async fn get_headline_count(&self, feed_name: &str) -> i64 {
        let rows = self
            .store
            .execute(
                "SELECT COUNT(*) AS headline_count FROM headlines WHERE feed_name = ?",
                &[feed_name],
            )
            .await;
        rows.first().map(|r| r.get_i64("headline_count")).unwrap_or(0)
    }

    /// Persists one successful fetch: stores headlines not yet seen for the
    /// feed (natural key: feed name + headline text), prunes rows older than
    /// the retention window, and stamps `last_retrieved`.
    ///
    /// Returns the number of newly stored headlines.
    pub async fn apply_fetch_result(
        &self,
        feed_name: &str,
        headlines: &[Headline],
        retention_days: i64,
    ) -> i64 {
        let before = self.get_headline_count(feed_name).await;

        for headline in headlines {
            if headline.headline.trim().is_empty() {
                continue;
            }
            self.store
                .execute(
                    "INSERT OR IGNORE INTO headlines \
                     (feed_name, headline_text, article_date, article_summary, \
                      article_text, article_url) \
                     VALUES (?, ?, ?, ?, ?, ?)",
                    &[
                        feed_name,
                        &headline.headline,
                        &headline.article_date,
                        &headline.article_summary,
                        &headline.article_text,
                        &headline.url,
                    ],
                )
                .await;
        }

        if retention_days > 0 {
            // Dates are stored in a lexicographically ordered layout, so the
            // cutoff comparison is plain text. Undated rows are kept.
            let cutoff = format_timestamp(Utc::now() - Duration::days(retention_days));
            self.store
                .execute(
                    "DELETE FROM headlines \
                     WHERE feed_name = ? AND article_date <> '' AND article_date < ?",
                    &[feed_name, &cutoff],
                )
                .await;
        }

        let stamp = now_timestamp();
        self.store
            .execute(
                "UPDATE feeds SET last_retrieved = ? WHERE feed_name = ?",
                &[&stamp, feed_name],
            )
            .await;

        let after = self.get_headline_count(feed_name).await;
        (after - before).max(0)
    }
}
