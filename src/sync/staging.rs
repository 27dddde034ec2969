use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::repo::{Feed, Headline};

/// The most recent unconsumed fetch result for one feed: the updated feed
/// snapshot and the complete list of headlines retrieved in that cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpdate {
    pub feed: Feed,
    pub headlines: Vec<Headline>,
}

/// Per-feed staging of newly retrieved data, keyed by feed name.
///
/// The engine is the only writer; the consumer is the only drainer. A
/// publish is a single atomic replace of the per-feed entry (the consumer
/// never observes a torn or field-by-field mutation), and holding a prior
/// generation is not supported: last write wins.
#[derive(Debug, Default)]
pub struct StagingArea {
    entries: Mutex<HashMap<String, StagedUpdate>>,
}

impl StagingArea {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Publishes the fetch result for a feed, overwriting any prior unread
    /// entry for that feed.
    pub fn publish(&self, feed: Feed, headlines: Vec<Headline>) {
        let name = feed.feed_name.clone();
        self.lock().insert(name, StagedUpdate { feed, headlines });
    }

    /// Removes and returns the pending entry for a feed. A repeat drain
    /// before the next publish returns `None`.
    pub fn drain(&self, feed_name: &str) -> Option<StagedUpdate> {
        self.lock().remove(feed_name)
    }

    pub fn has_pending(&self) -> bool {
        !self.lock().is_empty()
    }

    /// Names with pending entries, in name order.
    pub fn pending_feeds(&self) -> Vec<String> {
        let mut names: Vec<String> = self.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StagedUpdate>> {
        // The lock only guards map operations; a poisoned map is still valid.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(name: &str, retrieved: &str) -> Feed {
        Feed {
            feed_name: name.to_owned(),
            feed_url: format!("https://{name}.example.com/rss"),
            last_retrieved: retrieved.to_owned(),
            retrieve_limit_hrs: 1,
            retention_days: 45,
            article_count: 1,
            row_id: 1,
            last_index: -1,
        }
    }

    fn headline(text: &str) -> Headline {
        Headline {
            headline: text.to_owned(),
            ..Headline::default()
        }
    }

    #[test]
    fn publish_then_drain_round_trips() {
        let staging = StagingArea::new();
        let published = feed("news", "2024-03-02 10:00:00");
        staging.publish(published.clone(), vec![headline("A"), headline("B")]);

        assert!(staging.has_pending());
        let update = staging.drain("news").unwrap();
        assert_eq!(update.feed, published);
        assert_eq!(update.headlines.len(), 2);

        // Drained means gone until the next publish.
        assert!(staging.drain("news").is_none());
        assert!(!staging.has_pending());
    }

    #[test]
    fn publish_overwrites_prior_unread_entry() {
        let staging = StagingArea::new();
        staging.publish(feed("news", "2024-03-02 10:00:00"), vec![headline("old")]);
        staging.publish(feed("news", "2024-03-02 11:00:00"), vec![headline("new")]);

        let update = staging.drain("news").unwrap();
        assert_eq!(update.feed.last_retrieved, "2024-03-02 11:00:00");
        assert_eq!(update.headlines.len(), 1);
        assert_eq!(update.headlines[0].headline, "new");
    }

    #[test]
    fn pending_feeds_sorted_by_name() {
        let staging = StagingArea::new();
        staging.publish(feed("zebra", ""), vec![]);
        staging.publish(feed("aardvark", ""), vec![]);
        assert_eq!(staging.pending_feeds(), ["aardvark", "zebra"]);
    }

    #[test]
    fn drains_are_independent_per_feed() {
        let staging = StagingArea::new();
        staging.publish(feed("one", ""), vec![headline("a")]);
        staging.publish(feed("two", ""), vec![headline("b")]);

        assert!(staging.drain("one").is_some());
        assert!(staging.has_pending());
        assert!(staging.drain("two").is_some());
        assert!(!staging.has_pending());
    }
}
