//! Error types used by the orchestrator, its collaborators and running jobs.
//!
//! - [`GridError`]: a board that cannot be simulated (empty or ragged).
//! - [`RegistryError`]: the shared key/value store failed.
//! - [`BroadcastError`]: the push transport refused an event.
//! - [`OrchestratorError`]: synchronous failures of `submit` / `cancel`.
//! - [`JobError`]: a job loop that ended in the `failed` state.
//! - [`RuntimeError`]: failures of the orchestrator runtime itself.
//!
//! Every enum provides `as_label` (stable snake_case for logs/metrics) and
//! `as_message` (human-readable detail).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced while building a [`Grid`](crate::Grid).
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Zero rows or zero columns.
    #[error("grid is empty")]
    Empty,

    /// A row whose length differs from the first row.
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        /// Index of the offending row.
        row: usize,
        /// Length of row 0.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },

    /// `rows * cols` does not fit in memory addressing.
    #[error("grid of {rows}x{cols} cells is too large")]
    TooLarge {
        /// Requested rows.
        rows: usize,
        /// Requested columns.
        cols: usize,
    },

    /// A live-cell coordinate lies outside the board.
    #[error("cell ({row}, {col}) is outside a {rows}x{cols} grid")]
    OutOfBounds {
        /// Offending row index.
        row: usize,
        /// Offending column index.
        col: usize,
        /// Board rows.
        rows: usize,
        /// Board columns.
        cols: usize,
    },
}

impl GridError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            GridError::Empty => "grid_empty",
            GridError::Ragged { .. } => "grid_ragged",
            GridError::TooLarge { .. } => "grid_too_large",
            GridError::OutOfBounds { .. } => "grid_out_of_bounds",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        self.to_string()
    }
}

/// # Errors produced by a [`JobRegistry`](crate::JobRegistry) implementation.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum RegistryError {
    /// The store could not be reached or rejected the operation.
    #[error("registry unavailable: {error}")]
    Unavailable {
        /// The underlying error message.
        error: String,
    },
}

impl RegistryError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            RegistryError::Unavailable { .. } => "registry_unavailable",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RegistryError::Unavailable { error } => format!("unavailable: {error}"),
        }
    }
}

/// # Errors produced by a [`Broadcast`](crate::Broadcast) implementation.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum BroadcastError {
    /// The event could not be rendered to its wire form.
    #[error("failed to encode event: {error}")]
    Encode {
        /// The underlying error message.
        error: String,
    },

    /// The transport refused or lost the event.
    #[error("publish to '{topic}' failed: {error}")]
    Transport {
        /// Destination topic.
        topic: String,
        /// The underlying error message.
        error: String,
    },
}

impl BroadcastError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            BroadcastError::Encode { .. } => "broadcast_encode",
            BroadcastError::Transport { .. } => "broadcast_transport",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            BroadcastError::Encode { error } => format!("encode: {error}"),
            BroadcastError::Transport { topic, error } => format!("topic={topic}: {error}"),
        }
    }
}

/// # Errors returned synchronously by `submit` and `cancel`.
///
/// Nothing here ever reaches a job loop: a rejected submission never starts work.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum OrchestratorError {
    /// The submitted grid cannot be simulated.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] GridError),

    /// The dedup guard or cancellation flag could not be read or written.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The orchestrator is shutting down and accepts no new jobs.
    #[error("orchestrator is shutting down")]
    ShuttingDown,
}

impl OrchestratorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lifevisor::{GridError, OrchestratorError};
    ///
    /// let err = OrchestratorError::from(GridError::Empty);
    /// assert_eq!(err.as_label(), "invalid_input");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            OrchestratorError::InvalidInput(_) => "invalid_input",
            OrchestratorError::Registry(_) => "registry_failure",
            OrchestratorError::ShuttingDown => "shutting_down",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            OrchestratorError::InvalidInput(e) => format!("invalid input: {}", e.as_message()),
            OrchestratorError::Registry(e) => e.as_message(),
            OrchestratorError::ShuttingDown => "shutting down".to_string(),
        }
    }
}

/// # Computation failures inside a running job.
///
/// A job that returns one of these has already published a
/// `job_status{error}` event and released its `active_job` entry.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum JobError {
    /// Publishing a generation failed.
    #[error("broadcast failed: {0}")]
    Broadcast(#[from] BroadcastError),

    /// Polling the cancellation flag failed.
    #[error("registry failed: {0}")]
    Registry(#[from] RegistryError),

    /// A generation step panicked.
    #[error("generation panicked: {message}")]
    Panicked {
        /// Panic payload, when it was a string.
        message: String,
    },

    /// The task was aborted (shutdown grace exceeded) before it could finish.
    #[error("job aborted")]
    Aborted,
}

impl JobError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lifevisor::JobError;
    ///
    /// let err = JobError::Panicked { message: "boom".into() };
    /// assert_eq!(err.as_label(), "job_panicked");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            JobError::Broadcast(_) => "job_broadcast_failed",
            JobError::Registry(_) => "job_registry_failed",
            JobError::Panicked { .. } => "job_panicked",
            JobError::Aborted => "job_aborted",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            JobError::Broadcast(e) => e.as_message(),
            JobError::Registry(e) => e.as_message(),
            JobError::Panicked { message } => format!("panicked: {message}"),
            JobError::Aborted => "aborted".to_string(),
        }
    }
}

/// # Errors produced by the orchestrator runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some jobs were still running and got aborted.
    #[error("shutdown timeout {grace:?} exceeded; stuck: {stuck:?}; forcing termination")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Ids of the jobs that did not stop in time.
        stuck: Vec<String>,
    },

    /// OS signal handlers could not be installed.
    #[error("signal handler registration failed: {error}")]
    Signal {
        /// The underlying error message.
        error: String,
    },
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use lifevisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Signal { .. } => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck jobs={stuck:?}")
            }
            RuntimeError::Signal { error } => format!("signal: {error}"),
        }
    }
}
