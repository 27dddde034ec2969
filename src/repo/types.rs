use chrono::{DateTime, Duration, Utc};

use crate::store::Row;
use crate::util::parse_timestamp;

/// A feed definition plus its derived headline count.
///
/// Identity is the human-assigned `feed_name`, unique across the active set
/// and used as the lookup key everywhere. `last_index` is the consumer-side
/// cursor over surfaced headlines; it is in-memory only, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feed {
    pub feed_name: String,
    pub feed_url: String,
    /// Last successful retrieval instant in the persisted text layout;
    /// empty when the feed has never been retrieved.
    pub last_retrieved: String,
    /// Minimum retrieval interval in hours.
    pub retrieve_limit_hrs: i64,
    /// Retention window for headline rows, in days.
    pub retention_days: i64,
    pub article_count: i64,
    pub row_id: i64,
    pub last_index: i64,
}

impl Feed {
    /// True when two snapshots of the same feed differ in any externally
    /// observable attribute: source URL, retrieval timestamp, headline count.
    pub fn changed(old: &Feed, new: &Feed) -> bool {
        old.feed_url != new.feed_url
            || old.last_retrieved != new.last_retrieved
            || old.article_count != new.article_count
    }

    /// Freshness at `now`: less time elapsed since the last successful
    /// retrieval than the configured minimum interval. A feed that was
    /// never retrieved, or whose stored instant is unreadable, is stale.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        let Some(retrieved) = parse_timestamp(&self.last_retrieved) else {
            return false;
        };
        if self.retrieve_limit_hrs <= 0 {
            return false;
        }
        now - retrieved < Duration::hours(self.retrieve_limit_hrs)
    }

    pub(crate) fn from_row(row: &Row) -> Feed {
        Feed {
            feed_name: row.get("feed_name").unwrap_or_default().to_owned(),
            feed_url: row.get("feed_url").unwrap_or_default().to_owned(),
            last_retrieved: row.get("last_retrieved").unwrap_or_default().to_owned(),
            retrieve_limit_hrs: row.get_i64("retrieve_limit_hrs"),
            retention_days: row.get_i64("retention_days"),
            article_count: row.get_i64("article_count"),
            row_id: row.get_i64("rowid"),
            last_index: -1,
        }
    }
}

/// One headline/article record.
///
/// The (feed name, headline text) pair is the natural key; a record is never
/// mutated after creation, only deleted by retention pruning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headline {
    pub feed_name: String,
    pub headline: String,
    pub article_date: String,
    pub article_summary: String,
    pub article_text: String,
    pub url: String,
    pub row_id: i64,
}

impl Headline {
    pub(crate) fn from_row(row: &Row) -> Headline {
        Headline {
            feed_name: row.get("feed_name").unwrap_or_default().to_owned(),
            headline: row.get("headline_text").unwrap_or_default().to_owned(),
            article_date: row.get("article_date").unwrap_or_default().to_owned(),
            article_summary: row.get("article_summary").unwrap_or_default().to_owned(),
            article_text: row.get("article_text").unwrap_or_default().to_owned(),
            url: row.get("article_url").unwrap_or_default().to_owned(),
            row_id: row.get_i64("rowid"),
        }
    }
}
