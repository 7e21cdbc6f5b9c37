//! # Job model.
//!
//! - [`JobId`], [`UserId`] opaque identities (cheap to clone)
//! - [`Job`] one accepted submission, owned by the runner executing it
//! - [`JobState`] lifecycle state machine
//! - [`Step`] / [`StopReason`] result of one loop iteration
//! - [`JobReport`] summary returned to the owning execution context
//!
//! ## State machine
//! ```text
//! Idle ──► Running ──┬─► Converged   (generation == previous generation)
//!                    ├─► Cancelled   (flag set in registry, or local shutdown)
//!                    ├─► TimedOut    (elapsed > Config::max_runtime)
//!                    └─► Failed      (broadcast/registry error or panic)
//! ```
//! All four right-hand states are terminal.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::grid::Grid;

/// Opaque unique job token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Arc<str>);

impl JobId {
    /// Mints a fresh, time-ordered id.
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string().into())
    }

    /// Borrowed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for JobId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

/// Identity of the user owning a job; also selects the push topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Arc<str>);

impl UserId {
    /// Borrowed form.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.into())
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s.into())
    }
}

impl From<u64> for UserId {
    fn from(n: u64) -> Self {
        Self(n.to_string().into())
    }
}

/// Lifecycle state of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    /// Accepted, loop not started yet.
    Idle,
    /// Computing generations.
    Running,
    /// Reached a fixed point.
    Converged,
    /// Stopped on request.
    Cancelled,
    /// Hit the runtime ceiling.
    TimedOut,
    /// Ended with a [`JobError`](crate::JobError).
    Failed,
}

impl JobState {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::Running => "running",
            JobState::Converged => "converged",
            JobState::Cancelled => "cancelled",
            JobState::TimedOut => "timed_out",
            JobState::Failed => "failed",
        }
    }

    /// True for the four states the loop exits in.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobState::Idle | JobState::Running)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Why a loop stopped without failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The new generation equals the previous one.
    Converged,
    /// Cancellation was observed at the per-generation poll.
    Cancelled,
    /// Elapsed time exceeded the ceiling.
    TimedOut,
}

impl StopReason {
    /// Terminal state this reason leads to.
    pub fn state(self) -> JobState {
        match self {
            StopReason::Converged => JobState::Converged,
            StopReason::Cancelled => JobState::Cancelled,
            StopReason::TimedOut => JobState::TimedOut,
        }
    }

    /// Message of the final `job_status{idle}` event.
    pub fn message(self) -> &'static str {
        match self {
            StopReason::Converged => "converged",
            StopReason::Cancelled => "cancelled",
            StopReason::TimedOut => "timed out",
        }
    }
}

/// Outcome of one loop iteration.
#[derive(Debug)]
pub enum Step {
    /// Keep going from this generation.
    Continue(Arc<Grid>),
    /// Leave the loop.
    Stop(StopReason),
}

/// One accepted submission.
#[derive(Debug, Clone)]
pub struct Job {
    /// Unique token.
    pub id: JobId,
    /// Owner.
    pub user: UserId,
    /// Initial board.
    pub grid: Arc<Grid>,
    /// Wall-clock acceptance time.
    pub started_at: SystemTime,
    /// Current lifecycle state.
    pub state: JobState,
}

impl Job {
    /// Creates an idle job.
    pub fn new(id: JobId, user: UserId, grid: Grid) -> Self {
        Self {
            id,
            user,
            grid: Arc::new(grid),
            started_at: SystemTime::now(),
            state: JobState::Idle,
        }
    }
}

/// Summary of a job that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Job token.
    pub job_id: JobId,
    /// Owner.
    pub user: UserId,
    /// Terminal state (never `Failed`).
    pub state: JobState,
    /// Generations computed and published.
    pub generations: u64,
    /// Time spent in the loop.
    pub elapsed: Duration,
}
