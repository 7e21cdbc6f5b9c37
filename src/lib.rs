//! # lifevisor
//!
//! **Lifevisor** runs Game of Life simulations as long-lived, cancellable
//! background jobs and streams every generation to the owning user's topic.
//!
//! Each user has at most one running job. Jobs stop when the board reaches a
//! fixed point, when the user cancels, or when a runtime ceiling is hit.
//! Dedup guards and cancellation flags live in a shared key/value store, so
//! several orchestrator instances can cooperate.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   request handler (external)
//!      │ submit(grid, user) / cancel(job, user)
//!      ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Orchestrator                                                     │
//! │  - dedup guard via JobRegistry (active_job:<user>, 1h)            │
//! │  - cancellation flags via JobRegistry (cancelled:<job>, 24h)      │
//! │  - handle table (CancellationToken + shared join per job)         │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!     ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//!     │  JobRunner   │   │  JobRunner   │   │  JobRunner   │
//!     │ (user 1)     │   │ (user 2)     │   │ (user 3)     │
//!     └┬─────────────┘   └┬─────────────┘   └┬─────────────┘
//!      │ engine::next     │                  │
//!      │ grid_update      │ grid_update      │ grid_update
//!      │ job_status       │ job_status       │ job_status
//!      ▼                  ▼                  ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                 Broadcast (per-user topics)                       │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Lifecycle
//! ```text
//! submit ──► install guard ──► job_status{running,"started"} ──► tokio::spawn(JobRunner::run)
//!
//! loop {
//!   ├─► next = engine::next(current)
//!   ├─► publish grid_update{next}
//!   ├─► next == current            ─► Converged, exit
//!   ├─► cancelled flag / shutdown  ─► Cancelled, exit
//!   └─► elapsed > max_runtime      ─► TimedOut, exit
//! }
//!
//! On exit: publish final job_status, release guard, hand result to the owner.
//! On failure: publish job_status{error}, release guard, return JobError.
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                      |
//! |-------------------|----------------------------------------------------------|-----------------------------------------|
//! | **Simulation**    | Toroidal board and the pure generation step.             | [`Grid`], [`Cell`], [`grid::engine`]    |
//! | **Orchestration** | Dedup, cancellation, time ceiling, graceful shutdown.    | [`Orchestrator`], [`JobState`]          |
//! | **Registry**      | Shared store for guards and flags, with per-key expiry.  | [`JobRegistry`], [`MemoryRegistry`]     |
//! | **Push**          | Per-user topics carrying JSON events.                    | [`Broadcast`], [`TopicBus`], [`JobEvent`] |
//! | **Errors**        | Typed errors with stable labels.                         | [`OrchestratorError`], [`JobError`]     |
//! | **Configuration** | Policy constants as data.                                | [`Config`], [`DedupMode`]               |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use lifevisor::{Config, Grid, JobState, Orchestrator, TopicBus};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = Arc::new(TopicBus::default());
//!     let orch = Orchestrator::builder(Config::default())
//!         .with_broadcaster(bus.clone())
//!         .build();
//!
//!     let mut rx = bus.subscribe("game_of_life_channel_user_alice").await;
//!
//!     // On a 3x3 torus an L-tromino fills the board, then every cell dies.
//!     let grid = Grid::from_alive(3, 3, &[(0, 0), (0, 1), (1, 0)])?;
//!     let job = orch.submit(grid, "alice").await?;
//!
//!     let report = orch.join(&job).await.expect("spawned here")?;
//!     assert_eq!(report.state, JobState::Converged);
//!
//!     while let Ok(ev) = rx.try_recv() {
//!         println!("{}", ev.to_json()?);
//!     }
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
pub mod grid;
mod registry;

// ---- Public re-exports ----

pub use self::core::{
    Config, DedupMode, Job, JobId, JobReport, JobState, Orchestrator, OrchestratorBuilder, Step,
    StopReason, UserId,
};
pub use error::{BroadcastError, GridError, JobError, OrchestratorError, RegistryError, RuntimeError};
pub use events::{Broadcast, JobEvent, JobStatus, TopicBus, topic_for};
pub use grid::{Cell, Grid};
pub use registry::{JobRegistry, MemoryRegistry, active_job_key, cancelled_key};
