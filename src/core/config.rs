//! # Orchestrator configuration.
//!
//! Provides [`Config`] centralized policy settings. Every number here is a
//! resource bound, not a protocol contract; deployments may tune them freely.
//!
//! ## Sentinel values
//! - `max_runtime = 0s` → no ceiling (loop ends only on convergence or cancel)
//! - `generation_interval = 0s` → no pacing (yield to the scheduler between generations)

use std::time::Duration;

/// How `submit` installs the `active_job` guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupMode {
    /// Single compare-and-set through [`JobRegistry::set_if_absent`](crate::JobRegistry::set_if_absent).
    ///
    /// Two concurrent submissions for one user yield one job, provided the
    /// registry implements `set_if_absent` atomically.
    #[default]
    Atomic,

    /// `get`, then `set` if absent.
    ///
    /// Two concurrent submissions can both observe "no active job" and start
    /// two jobs. Kept for deployments whose store has no atomic primitive.
    CheckThenSet,
}

/// Global configuration for the orchestrator.
///
/// ## Field semantics
/// - `max_runtime`: loop ceiling per job (`0s` = none)
/// - `active_job_ttl`: expiry of `active_job:<user>`
/// - `cancel_ttl`: expiry of `cancelled:<job>`
/// - `generation_interval`: pause between generations (`0s` = none)
/// - `bus_capacity`: per-topic buffer of the default [`TopicBus`](crate::TopicBus) (min 1)
/// - `grace`: how long `run_until_signal` waits for jobs to stop
/// - `dedup`: see [`DedupMode`]
/// - `topic_prefix`: user topic is `topic_prefix + user_id`
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time one job may keep computing generations.
    ///
    /// Checked once per generation after publishing; the job ends in
    /// `TimedOut` on the first check where elapsed time exceeds it.
    pub max_runtime: Duration,

    /// Expiry of the dedup guard.
    ///
    /// Must exceed `max_runtime`, otherwise a second job could start while
    /// the first is still running.
    pub active_job_ttl: Duration,

    /// Expiry of the cancellation flag.
    pub cancel_ttl: Duration,

    /// Pause between generations.
    ///
    /// The pause is cut short when the orchestrator shuts down or the job is
    /// cancelled locally.
    pub generation_interval: Duration,

    /// Per-topic ring buffer size of the default broadcaster.
    pub bus_capacity: usize,

    /// Maximum wait for jobs to stop on shutdown.
    pub grace: Duration,

    /// Dedup guard installation strategy.
    pub dedup: DedupMode,

    /// Prefix of per-user topic names.
    pub topic_prefix: String,
}

impl Config {
    /// Returns the loop ceiling as an `Option`.
    ///
    /// - `None` → no ceiling
    /// - `Some(d)` → jobs stop once elapsed time exceeds `d`
    #[inline]
    pub fn runtime_ceiling(&self) -> Option<Duration> {
        if self.max_runtime == Duration::ZERO {
            None
        } else {
            Some(self.max_runtime)
        }
    }

    /// Returns the pause between generations as an `Option`.
    #[inline]
    pub fn pacing(&self) -> Option<Duration> {
        if self.generation_interval == Duration::ZERO {
            None
        } else {
            Some(self.generation_interval)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `max_runtime = 5m`
    /// - `active_job_ttl = 1h`
    /// - `cancel_ttl = 24h`
    /// - `generation_interval = 0s` (no pacing)
    /// - `bus_capacity = 1024`
    /// - `grace = 30s`
    /// - `dedup = DedupMode::Atomic`
    /// - `topic_prefix = "game_of_life_channel_user_"`
    fn default() -> Self {
        Self {
            max_runtime: Duration::from_secs(5 * 60),
            active_job_ttl: Duration::from_secs(60 * 60),
            cancel_ttl: Duration::from_secs(24 * 60 * 60),
            generation_interval: Duration::ZERO,
            bus_capacity: 1024,
            grace: Duration::from_secs(30),
            dedup: DedupMode::default(),
            topic_prefix: "game_of_life_channel_user_".to_string(),
        }
    }
}
