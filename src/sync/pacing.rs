use chrono::{DateTime, Duration, Utc};

/// Why a polling tick declined to run a download cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    /// A recent cycle succeeded; all network traffic is suppressed until
    /// the success cooldown elapses.
    AfterSuccess { remaining_secs: i64 },
    /// The consecutive-failure ceiling was reached; attempts are suppressed
    /// until the cooldown since the last failure elapses. `notify` is true
    /// exactly once per failure episode.
    AfterFailures { remaining_secs: i64, notify: bool },
}

/// Process-lifetime download-attempt state.
///
/// Tracks the run's success and failure tallies, the instants behind the two
/// cooldown gates, and the diagnostic-suppression flags. Nothing here reads
/// a clock or touches the network; the engine passes `now` in, so every
/// backoff decision is a pure function of `(state, now)`.
///
/// Feed-by-feed retries absorb transient blips immediately; these gates are
/// the opposite end of that asymmetry, suppressing *all* traffic for minutes
/// at a time after a completed run or sustained unavailability, out of
/// respect for third-party rate limits.
#[derive(Debug)]
pub struct Pacing {
    success_cooldown: Duration,
    failure_cooldown: Duration,
    max_failed_attempts: u32,
    cycle_successes: u32,
    failed_attempts: u32,
    last_success_at: Option<DateTime<Utc>>,
    last_failure_at: Option<DateTime<Utc>>,
    progress_enabled: bool,
    failure_notice_emitted: bool,
}

impl Pacing {
    pub fn new(
        success_cooldown_secs: u64,
        failure_cooldown_secs: u64,
        max_failed_attempts: u32,
    ) -> Self {
        Self {
            success_cooldown: Duration::seconds(success_cooldown_secs as i64),
            failure_cooldown: Duration::seconds(failure_cooldown_secs as i64),
            max_failed_attempts,
            cycle_successes: 0,
            failed_attempts: 0,
            last_success_at: None,
            last_failure_at: None,
            progress_enabled: true,
            failure_notice_emitted: false,
        }
    }

    /// Gate evaluated at the top of each proceeding tick.
    ///
    /// The success hold is checked first: a run that just succeeded
    /// suppresses traffic even when the failure ceiling is also active.
    /// Crossing either window re-enables progress diagnostics; crossing the
    /// failure window also resets the failure tally.
    pub fn gate(&mut self, now: DateTime<Utc>) -> Option<Hold> {
        if self.cycle_successes > 0 {
            if let Some(last) = self.last_success_at {
                let elapsed = now - last;
                if elapsed < self.success_cooldown {
                    return Some(Hold::AfterSuccess {
                        remaining_secs: (self.success_cooldown - elapsed).num_seconds(),
                    });
                }
            }
            self.progress_enabled = true;
        }

        if self.failed_attempts >= self.max_failed_attempts {
            let last = self.last_failure_at.unwrap_or(now);
            let elapsed = now - last;
            if elapsed <= self.failure_cooldown {
                let notify = !self.failure_notice_emitted;
                self.failure_notice_emitted = true;
                return Some(Hold::AfterFailures {
                    remaining_secs: (self.failure_cooldown - elapsed).num_seconds(),
                    notify,
                });
            }
            self.failed_attempts = 0;
            self.progress_enabled = true;
        }

        None
    }

    /// Starts a download cycle. The per-cycle success tally resets; the
    /// cross-cycle failure tally does not. It survives interleaved
    /// successes and only resets when the failure cooldown elapses.
    pub fn begin_cycle(&mut self) {
        self.cycle_successes = 0;
    }

    /// A feed skipped as fresh counts toward the run's successes, and the
    /// engine adopts the feed's stored retrieval instant, so a process
    /// relaunched inside the cooldown window holds instead of re-fetching.
    pub fn note_fresh_skip(&mut self, last_retrieved: Option<DateTime<Utc>>) {
        self.cycle_successes += 1;
        if let Some(at) = last_retrieved {
            self.last_success_at = Some(at);
        }
    }

    pub fn record_success(&mut self) {
        self.cycle_successes += 1;
    }

    /// A feed that exhausted its retry ceiling counts exactly one failure,
    /// regardless of how many attempts were made.
    pub fn record_exhausted(&mut self, now: DateTime<Utc>) {
        self.failed_attempts += 1;
        if self.failed_attempts >= self.max_failed_attempts {
            self.last_failure_at = Some(now);
            self.failure_notice_emitted = false;
            self.progress_enabled = false;
        }
    }

    /// Ends a cycle. With any successes, the completion instant is stamped
    /// and ordinary progress diagnostics are suppressed until the next
    /// notable transition. Returns whether the cycle had successes.
    pub fn finish_cycle(&mut self, now: DateTime<Utc>) -> bool {
        if self.cycle_successes > 0 {
            self.last_success_at = Some(now);
            self.progress_enabled = false;
            true
        } else {
            false
        }
    }

    pub fn progress_enabled(&self) -> bool {
        self.progress_enabled
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn cycle_successes(&self) -> u32 {
        self.cycle_successes
    }
}
