//! Runtime core: job orchestration and lifecycle.
//!
//! The public API from this module is [`Orchestrator`] (plus its builder and
//! configuration) and the job model types.
//!
//! Internal modules:
//! - [`orchestrator`]: dedup, submission, cancellation, handle table, shutdown;
//! - [`runner`]: the per-job generation loop with its termination policy;
//! - [`guard`]: scoped release of the `active_job` registry entry;
//! - [`builder`]: collaborator injection;
//! - [`shutdown`]: cross-platform termination signal wait.

mod builder;
mod config;
mod guard;
mod job;
mod orchestrator;
mod runner;
mod shutdown;

pub use builder::OrchestratorBuilder;
pub use config::{Config, DedupMode};
pub use job::{Job, JobId, JobReport, JobState, Step, StopReason, UserId};
pub use orchestrator::Orchestrator;
