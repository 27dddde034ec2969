use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;

use super::pacing::{Hold, Pacing};
use super::staging::StagingArea;
use crate::config::Config;
use crate::fetch::{self, Client};
use crate::repo::{Feed, FeedRepository};
use crate::util::parse_timestamp;

/// External control signals. One typed channel carries all of them; the
/// engine shares no raw flags with other contexts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Start,
    Stop,
    /// An external feed-edit is about to run; hold the polling loop so the
    /// edit does not race the engine's own writes to the feed list.
    PauseForManagement,
    ResumeAfterManagement,
}

/// Cheap-clone sender half handed to whoever supervises the engine.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<Control>,
}

impl EngineHandle {
    pub async fn start(&self) {
        let _ = self.tx.send(Control::Start).await;
    }

    /// Requests shutdown. Observed within one tick; an in-flight feed
    /// attempt finishes, but no new feed or retry attempt starts.
    pub async fn stop(&self) {
        let _ = self.tx.send(Control::Stop).await;
    }

    pub async fn pause_for_management(&self) {
        let _ = self.tx.send(Control::PauseForManagement).await;
    }

    pub async fn resume_after_management(&self) {
        let _ = self.tx.send(Control::ResumeAfterManagement).await;
    }
}

/// The core scheduler: owns the polling loop, the backoff state, the
/// per-feed retry loop, and write access to the staging area.
///
/// Idle until a start signal arrives, then polls on a short fixed tick.
/// Each proceeding tick re-reads the feed list and works through it in
/// listing order, one feed at a time.
pub struct SyncEngine {
    repo: FeedRepository,
    client: Client,
    staging: Arc<StagingArea>,
    pacing: Pacing,
    tick: Duration,
    retry_ceiling: u32,
    expiry_enabled: bool,
    control: mpsc::Receiver<Control>,
    paused: bool,
    stopping: bool,
}

impl SyncEngine {
    pub fn new(
        repo: FeedRepository,
        client: Client,
        staging: Arc<StagingArea>,
        config: &Config,
    ) -> (Self, EngineHandle) {
        let (tx, control) = mpsc::channel(16);
        let engine = Self {
            repo,
            client,
            staging,
            pacing: Pacing::new(
                config.success_cooldown_secs,
                config.failure_cooldown_secs,
                config.max_failed_attempts,
            ),
            tick: Duration::from_secs(config.poll_interval_secs.max(1)),
            retry_ceiling: config.retry_ceiling.max(1),
            expiry_enabled: config.feed_expiry_enabled,
            control,
            paused: false,
            stopping: false,
        };
        (engine, EngineHandle { tx })
    }

    /// Runs the engine to completion. Intended to be spawned as a task; it
    /// returns once a stop signal is observed (or every handle is dropped).
    pub async fn run(mut self) {
        // Idle: nothing happens until an external start. Pause state is
        // still tracked so a management edit begun before start holds the
        // first cycle.
        loop {
            match self.control.recv().await {
                Some(Control::Start) => break,
                Some(Control::Stop) | None => {
                    tracing::info!("engine stopped before start");
                    return;
                }
                Some(Control::PauseForManagement) => self.paused = true,
                Some(Control::ResumeAfterManagement) => self.paused = false,
            }
        }

        tracing::info!(
            tick_secs = self.tick.as_secs(),
            retry_ceiling = self.retry_ceiling,
            "feed synchronization started"
        );

        while !self.stopping {
            tokio::select! {
                signal = self.control.recv() => self.apply_control(signal),
                _ = tokio::time::sleep(self.tick) => self.poll_tick().await,
            }
        }

        tracing::info!("feed synchronization stopped");
    }

    fn apply_control(&mut self, signal: Option<Control>) {
        match signal {
            Some(Control::Stop) | None => self.stopping = true,
            Some(Control::PauseForManagement) => self.paused = true,
            Some(Control::ResumeAfterManagement) => self.paused = false,
            Some(Control::Start) => {}
        }
    }

    /// Drains control signals that arrived mid-cycle. Returns true when a
    /// stop has been observed.
    fn poll_control(&mut self) -> bool {
        while let Ok(signal) = self.control.try_recv() {
            self.apply_control(Some(signal));
        }
        self.stopping
    }

    async fn poll_tick(&mut self) {
        let feeds = self.repo.list_feeds().await;

        // Skip-cycle conditions: nothing to fetch, an external feed edit in
        // progress, or a staged result the consumer has not drained yet.
        // The engine never races ahead of a slow consumer.
        if feeds.is_empty() || self.paused || self.staging.has_pending() {
            return;
        }

        match self.pacing.gate(Utc::now()) {
            Some(Hold::AfterSuccess { remaining_secs }) => {
                tracing::trace!(remaining_secs, "holding after recent successful run");
                return;
            }
            Some(Hold::AfterFailures {
                remaining_secs,
                notify,
            }) => {
                if notify {
                    tracing::warn!(
                        remaining_secs,
                        "several failed downloads; suspending attempts until cooldown elapses"
                    );
                }
                return;
            }
            None => {}
        }

        if self.pacing.progress_enabled() {
            tracing::info!(feeds = feeds.len(), "preparing to download");
        }
        self.pacing.begin_cycle();

        for feed in &feeds {
            // A feed missing its name or URL cannot be fetched or keyed;
            // skip it without touching either counter.
            if feed.feed_name.is_empty() || feed.feed_url.is_empty() {
                tracing::debug!(row_id = feed.row_id, "skipping misconfigured feed");
                continue;
            }

            if self.poll_control() {
                break;
            }

            if self
                .repo
                .is_feed_fresh(&feed.feed_name, self.expiry_enabled)
                .await
            {
                self.pacing
                    .note_fresh_skip(parse_timestamp(&feed.last_retrieved));
                continue;
            }

            self.attempt_feed(feed).await;

            if self.stopping {
                break;
            }
        }

        if self.pacing.finish_cycle(Utc::now()) {
            let staged = self.staging.pending_feeds();
            tracing::info!(staged_feeds = ?staged, "download cycle complete");
        }
    }

    /// Fetches one stale feed with immediate retries, then publishes a
    /// staging entry when the stored state meaningfully changed.
    async fn attempt_feed(&mut self, feed: &Feed) {
        tracing::debug!(feed = %feed.feed_name, "download attempt");

        let mut retrieved = None;
        for attempt in 1..=self.retry_ceiling {
            // Transient blips are absorbed by retrying immediately; the
            // minutes-long holds live at the run level, not here.
            let outcome = fetch::refresh_feed(&self.repo, &self.client, feed).await;
            if outcome.status.is_success() {
                retrieved = Some(outcome.headlines);
                self.pacing.record_success();
                tracing::info!(feed = %feed.feed_name, attempt, "download succeeded");
                break;
            }

            if attempt == self.retry_ceiling {
                self.pacing.record_exhausted(Utc::now());
                tracing::warn!(
                    feed = %feed.feed_name,
                    attempts = attempt,
                    status = outcome.status.0,
                    "download failed"
                );
            }

            if self.poll_control() {
                return;
            }
        }

        let Some(headlines) = retrieved else {
            return;
        };

        // Change detection against the pre-attempt snapshot. Only a real
        // difference reaches the consumer; an unchanged feed stays quiet.
        let mut current = self.repo.get_feed(&feed.feed_name).await;
        if Feed::changed(feed, &current) {
            current.last_index = -1;
            self.staging.publish(current, headlines);
        }
    }
}
