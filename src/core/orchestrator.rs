//! # Orchestrator: deduplicated submission, cancellation and job ownership.
//!
//! The [`Orchestrator`] accepts grids, installs the per-user dedup guard in
//! the shared [`JobRegistry`], announces status on the user's topic and spawns
//! one [`JobRunner`] task per accepted job. It keeps the local join handles so
//! the owning context can collect each job's result ([`Orchestrator::join`])
//! and so shutdown can stop everything within a grace period.
//!
//! ## Architecture
//! ```text
//! submit(grid, user)
//!   ├─► active_job:<user> already set? ──► job_status{running,"already running"} ──► existing id
//!   └─► set active_job:<user> = id (1h)
//!         ├─► job_status{running,"started"}
//!         └─► tokio::spawn(JobRunner::run(job, guard)) ──► handle table
//!
//! cancel(id, user)
//!   ├─► set cancelled:<id> (24h)                 (polled by the loop, any process)
//!   ├─► local token of <id>, if running here     (cuts pacing short)
//!   └─► delete active_job:<user> if it is <id> ──► job_status{idle,"stopped"}
//!
//! shutdown(grace)
//!   └─► runtime_token.cancel() → every job stops at its next poll
//!        ├─ all joined within grace → Ok
//!        └─ otherwise abort stragglers → RuntimeError::GraceExceeded
//! ```
//!
//! ## Dedup
//! With [`DedupMode::Atomic`] the guard is installed through
//! `set_if_absent`, closing the check-then-set race when the registry
//! implements it atomically. [`DedupMode::CheckThenSet`] keeps the race.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use tokio::sync::RwLock;
use tokio::task::{AbortHandle, JoinError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::core::config::{Config, DedupMode};
use crate::core::guard::ActiveJobGuard;
use crate::core::runner::{JobRunner, RunParams, panic_message};
use crate::core::{Job, JobId, JobReport, UserId, shutdown};
use crate::error::{JobError, OrchestratorError, RuntimeError};
use crate::events::{Broadcast, JobEvent, JobStatus, topic_for};
use crate::grid::{Cell, Grid};
use crate::registry::{JobRegistry, active_job_key, cancelled_key};

use super::builder::OrchestratorBuilder;

type Outcome = Result<JobReport, JobError>;

/// Handle to a job running in this process.
///
/// Stays in the table until a `join` completes or shutdown drains it, so
/// `cancel` and `shutdown` reach the job while someone is waiting on it.
struct Handle {
    user: UserId,
    cancel: CancellationToken,
    abort: AbortHandle,
    /// Resolves once the task exits; `join` and `shutdown` await clones.
    done: Shared<BoxFuture<'static, Outcome>>,
}

/// Coordinates job submission, cancellation and shutdown.
pub struct Orchestrator {
    cfg: Config,
    registry: Arc<dyn JobRegistry>,
    broadcaster: Arc<dyn Broadcast>,
    runtime_token: CancellationToken,
    jobs: RwLock<HashMap<JobId, Handle>>,
}

impl Orchestrator {
    /// Starts building an orchestrator.
    ///
    /// # Example
    /// ```
    /// use std::sync::Arc;
    /// use lifevisor::{Config, Grid, JobStatus, Orchestrator, TopicBus};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let bus = Arc::new(TopicBus::default());
    /// let orch = Orchestrator::builder(Config::default())
    ///     .with_broadcaster(bus.clone())
    ///     .build();
    ///
    /// let mut rx = bus.subscribe("game_of_life_channel_user_7").await;
    /// let id = orch.submit(Grid::from_alive(3, 3, &[(1, 1)])?, 7u64).await?;
    ///
    /// let first = rx.recv().await?;
    /// assert_eq!(first.job_status(), Some(JobStatus::Running));
    ///
    /// let report = orch.join(&id).await.expect("spawned here")?;
    /// assert!(report.state.is_terminal());
    /// # Ok(())
    /// # }
    /// ```
    pub fn builder(cfg: Config) -> OrchestratorBuilder {
        OrchestratorBuilder::new(cfg)
    }

    pub(super) fn new_internal(
        cfg: Config,
        registry: Arc<dyn JobRegistry>,
        broadcaster: Arc<dyn Broadcast>,
    ) -> Self {
        Self {
            cfg,
            registry,
            broadcaster,
            runtime_token: CancellationToken::new(),
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Topic carrying `user`'s events.
    pub fn topic(&self, user: &UserId) -> String {
        topic_for(&self.cfg.topic_prefix, user.as_str())
    }

    /// Validates raw rows and submits them.
    ///
    /// Empty or ragged input is rejected with [`OrchestratorError::InvalidInput`]
    /// before the registry is touched.
    pub async fn submit_rows(
        &self,
        rows: Vec<Vec<Cell>>,
        user: impl Into<UserId>,
    ) -> Result<JobId, OrchestratorError> {
        let grid = Grid::new(rows)?;
        self.submit(grid, user).await
    }

    /// Submits `grid` for `user`.
    ///
    /// Returns the id of the user's already-running job if there is one,
    /// otherwise a freshly minted id whose loop has been scheduled. Never waits
    /// for a generation to compute.
    pub async fn submit(
        &self,
        grid: Grid,
        user: impl Into<UserId>,
    ) -> Result<JobId, OrchestratorError> {
        let user = user.into();
        if self.runtime_token.is_cancelled() {
            return Err(OrchestratorError::ShuttingDown);
        }

        let topic = self.topic(&user);
        let key = active_job_key(user.as_str());
        let candidate = JobId::generate();

        if let Some(existing) = self.install_guard(&key, &candidate).await? {
            let existing = JobId::from(existing);
            info!(job_id = %existing, user = %user, "job already running");
            self.emit(
                &topic,
                JobEvent::status(JobStatus::Running, &existing, "already running"),
            )
            .await;
            return Ok(existing);
        }

        // Owns the entry from here on: if this future is dropped before the
        // job is spawned, the guard's drop releases it.
        let guard = ActiveJobGuard::new(Arc::clone(&self.registry), &user, &candidate);

        info!(job_id = %candidate, user = %user, rows = grid.rows(), cols = grid.cols(), "job accepted");
        self.emit(
            &topic,
            JobEvent::status(JobStatus::Running, &candidate, "started"),
        )
        .await;

        let job = Job::new(candidate.clone(), user, grid);
        self.spawn_job(job, topic, guard).await;
        Ok(candidate)
    }

    /// Requests cancellation of `job_id` on behalf of `user`.
    ///
    /// Idempotent: cancelling an unknown or finished job succeeds and emits nothing.
    pub async fn cancel(
        &self,
        job_id: &JobId,
        user: impl Into<UserId>,
    ) -> Result<(), OrchestratorError> {
        let user = user.into();
        self.registry
            .set(&cancelled_key(job_id.as_str()), "1", self.cfg.cancel_ttl)
            .await?;

        if let Some(h) = self.jobs.read().await.get(job_id) {
            if h.user == user {
                h.cancel.cancel();
            }
        }

        let removed = self
            .registry
            .delete_if_eq(&active_job_key(user.as_str()), job_id.as_str())
            .await?;
        if removed {
            info!(job_id = %job_id, user = %user, "job cancelled");
            self.emit(
                &self.topic(&user),
                JobEvent::status(JobStatus::Idle, job_id, "stopped"),
            )
            .await;
        } else {
            debug!(job_id = %job_id, user = %user, "cancel: no active job entry");
        }
        Ok(())
    }

    /// Waits for a job spawned by this orchestrator and returns its result.
    ///
    /// Returns `None` if the job is unknown here or its handle was already
    /// collected (joined, drained by shutdown, or reaped once many finished
    /// handles pile up). Failures arrive as `Some(Err(..))` after the job has
    /// published its error status and released its registry entry.
    ///
    /// Several callers may join the same job; each gets the outcome.
    pub async fn join(&self, job_id: &JobId) -> Option<Outcome> {
        let done = self.jobs.read().await.get(job_id)?.done.clone();
        let outcome = done.await;
        let _ = self.jobs.write().await.remove(job_id);
        Some(outcome)
    }

    /// Sorted ids of jobs still running in this process.
    pub async fn active_jobs(&self) -> Vec<JobId> {
        let jobs = self.jobs.read().await;
        let mut ids: Vec<JobId> = jobs
            .iter()
            .filter(|(_, h)| !h.abort.is_finished())
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Stops every local job and waits up to `grace` for them to exit.
    ///
    /// Jobs observe shutdown at their next per-generation poll and end as
    /// `Cancelled`. Stragglers are aborted; their guards release on drop and
    /// pending `join`s resolve with [`JobError::Aborted`].
    /// Subsequent submissions fail with [`OrchestratorError::ShuttingDown`].
    pub async fn shutdown(&self, grace: Duration) -> Result<(), RuntimeError> {
        self.runtime_token.cancel();
        let handles: Vec<(JobId, Handle)> = self.jobs.write().await.drain().collect();
        info!(jobs = handles.len(), ?grace, "shutting down");

        let done = future::join_all(handles.iter().map(|(_, h)| h.done.clone()));
        if time_bounded(grace, done).await {
            info!("all jobs stopped within grace");
            return Ok(());
        }

        let mut stuck = Vec::new();
        for (id, h) in &handles {
            if !h.abort.is_finished() {
                h.abort.abort();
                stuck.push(id.to_string());
            }
        }
        stuck.sort_unstable();
        warn!(?stuck, "grace exceeded; aborting jobs");
        Err(RuntimeError::GraceExceeded { grace, stuck })
    }

    /// Waits for a termination signal, then shuts down within `Config::grace`.
    pub async fn run_until_signal(&self) -> Result<(), RuntimeError> {
        let signal = shutdown::termination()
            .await
            .map_err(|e| RuntimeError::Signal {
                error: e.to_string(),
            })?;
        info!(signal, "shutdown requested");
        self.shutdown(self.cfg.grace).await
    }

    /// Installs `active_job:<user> = candidate` unless a job is already active.
    ///
    /// Returns the existing job id when one is active.
    async fn install_guard(
        &self,
        key: &str,
        candidate: &JobId,
    ) -> Result<Option<String>, OrchestratorError> {
        let ttl = self.cfg.active_job_ttl;
        let existing = match self.cfg.dedup {
            DedupMode::Atomic => {
                self.registry
                    .set_if_absent(key, candidate.as_str(), ttl)
                    .await?
            }
            DedupMode::CheckThenSet => match self.registry.get(key).await? {
                Some(v) => Some(v),
                None => {
                    self.registry.set(key, candidate.as_str(), ttl).await?;
                    None
                }
            },
        };
        Ok(existing)
    }

    /// Spawns the loop and records its handle.
    ///
    /// The table lock is taken before spawning, so a caller dropped while
    /// waiting for it drops the guard instead of leaking an untracked task.
    async fn spawn_job(&self, job: Job, topic: String, guard: ActiveJobGuard) {
        let mut jobs = self.jobs.write().await;
        if jobs.len() >= REAP_AFTER {
            reap(&mut jobs);
        }

        let token = self.runtime_token.child_token();
        let runner = JobRunner {
            registry: Arc::clone(&self.registry),
            broadcaster: Arc::clone(&self.broadcaster),
            topic,
            params: RunParams {
                max_runtime: self.cfg.runtime_ceiling(),
                interval: self.cfg.pacing(),
            },
            token: token.clone(),
        };

        let id = job.id.clone();
        let user = job.user.clone();
        let join = tokio::spawn(runner.run(job, guard));
        let abort = join.abort_handle();
        let done = join.map(settle).boxed().shared();

        let _ = jobs.insert(
            id,
            Handle {
                user,
                cancel: token,
                abort,
                done,
            },
        );
    }

    /// Publishes a status event; push is fire-and-forget, so failures are only logged.
    async fn emit(&self, topic: &str, event: JobEvent) {
        if let Err(e) = self.broadcaster.publish(topic, event).await {
            warn!(topic, error = %e, "failed to publish job status");
        }
    }
}

/// Uncollected handles tolerated before finished ones are dropped.
const REAP_AFTER: usize = 256;

/// Drops handles of finished jobs; their outcome was already logged by the runner.
fn reap(jobs: &mut HashMap<JobId, Handle>) {
    let before = jobs.len();
    jobs.retain(|_, h| !h.abort.is_finished());
    debug!(reaped = before - jobs.len(), "reaped finished job handles");
}

/// Folds the task's join result into the job outcome.
fn settle(res: Result<Outcome, JoinError>) -> Outcome {
    match res {
        Ok(outcome) => outcome,
        Err(je) if je.is_panic() => Err(JobError::Panicked {
            message: panic_message(je.into_panic().as_ref()),
        }),
        Err(_) => Err(JobError::Aborted),
    }
}

async fn time_bounded<F: Future>(limit: Duration, fut: F) -> bool {
    tokio::time::timeout(limit, fut).await.is_ok()
}
