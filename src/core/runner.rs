//! # JobRunner: the per-job generation loop.
//!
//! Drives one [`Job`] from its initial grid to a terminal state, publishing
//! every generation on the owner's topic.
//!
//! ## Event flow
//! ```text
//! loop {
//!   ├─► next = engine::next(current)            (1)
//!   ├─► publish grid_update{next}               (2)
//!   ├─► next == current          → Stop(Converged)
//!   ├─► current = next
//!   ├─► cancelled:<job> set / local token       → Stop(Cancelled)
//!   ├─► elapsed > max_runtime                   → Stop(TimedOut)
//!   └─► pace (sleep interval or yield), continue
//! }
//!
//! Stop(reason) → publish job_status{idle, reason} → release guard → Ok(report)
//! Err / panic  → publish job_status{error, text}  → release guard → Err(error)
//! ```
//!
//! ## Rules
//! - Generations are **strictly sequential**: `n+1` is computed only after
//!   `n` was published.
//! - Cancellation is **cooperative**, polled once per generation; a
//!   generation always runs to completion once started.
//! - The `active_job` guard is released on **every** exit path before the
//!   result reaches the owning task.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::core::guard::ActiveJobGuard;
use crate::core::{Job, JobReport, JobState, Step, StopReason};
use crate::error::JobError;
use crate::events::{Broadcast, JobEvent, JobStatus};
use crate::grid::{Grid, engine};
use crate::registry::{JobRegistry, cancelled_key};

/// Loop parameters extracted from [`Config`](crate::Config).
#[derive(Clone, Copy, Debug)]
pub(crate) struct RunParams {
    /// Loop ceiling (`None` = none).
    pub max_runtime: Option<Duration>,
    /// Pause between generations (`None` = yield only).
    pub interval: Option<Duration>,
}

/// Executes one job.
pub(crate) struct JobRunner {
    pub registry: Arc<dyn JobRegistry>,
    pub broadcaster: Arc<dyn Broadcast>,
    pub topic: String,
    pub params: RunParams,
    /// Local cancellation (orchestrator shutdown or same-process cancel).
    pub token: CancellationToken,
}

impl JobRunner {
    /// Runs the loop until a terminal state, then releases `guard`.
    pub async fn run(self, mut job: Job, guard: ActiveJobGuard) -> Result<JobReport, JobError> {
        let started = Instant::now();
        let cancel_key = cancelled_key(job.id.as_str());
        job.state = JobState::Running;
        info!(
            job_id = %job.id,
            user = %job.user,
            rows = job.grid.rows(),
            cols = job.grid.cols(),
            "job started"
        );

        let mut generations: u64 = 0;
        let mut current = Arc::clone(&job.grid);
        let outcome: Result<StopReason, JobError> = loop {
            let step = AssertUnwindSafe(self.step(&current, &cancel_key, started))
                .catch_unwind()
                .await;
            match step {
                Ok(Ok(Step::Continue(next))) => {
                    generations += 1;
                    current = next;
                    self.pace().await;
                }
                Ok(Ok(Step::Stop(reason))) => {
                    generations += 1;
                    break Ok(reason);
                }
                Ok(Err(e)) => break Err(e),
                Err(panic) => {
                    break Err(JobError::Panicked {
                        message: panic_message(panic.as_ref()),
                    });
                }
            }
        };

        let elapsed = started.elapsed();
        job.state = match &outcome {
            Ok(reason) => reason.state(),
            Err(_) => JobState::Failed,
        };

        let final_event = match &outcome {
            Ok(reason) => JobEvent::status(JobStatus::Idle, &job.id, reason.message()),
            Err(e) => JobEvent::status(JobStatus::Error, &job.id, e.to_string()),
        };
        if let Err(e) = self.broadcaster.publish(&self.topic, final_event).await {
            warn!(job_id = %job.id, error = %e, "failed to publish final job status");
        }

        match guard.release().await {
            Ok(removed) => debug!(job_id = %job.id, removed, "active job released"),
            Err(e) => warn!(job_id = %job.id, error = %e, "failed to release active job; entry left to expire"),
        }

        match outcome {
            Ok(_) => {
                info!(
                    job_id = %job.id,
                    user = %job.user,
                    state = %job.state,
                    generations,
                    ?elapsed,
                    "job finished"
                );
                Ok(JobReport {
                    job_id: job.id,
                    user: job.user,
                    state: job.state,
                    generations,
                    elapsed,
                })
            }
            Err(e) => {
                error!(
                    job_id = %job.id,
                    user = %job.user,
                    generations,
                    error = %e,
                    label = e.as_label(),
                    "job failed"
                );
                Err(e)
            }
        }
    }

    /// One iteration: compute, publish, then decide.
    async fn step(
        &self,
        current: &Arc<Grid>,
        cancel_key: &str,
        started: Instant,
    ) -> Result<Step, JobError> {
        let next = Arc::new(engine::next(current));
        self.broadcaster
            .publish(&self.topic, JobEvent::grid_update(Arc::clone(&next)))
            .await?;

        if next == *current {
            return Ok(Step::Stop(StopReason::Converged));
        }
        if self.token.is_cancelled() || self.registry.get(cancel_key).await?.is_some() {
            return Ok(Step::Stop(StopReason::Cancelled));
        }
        if self
            .params
            .max_runtime
            .is_some_and(|max| started.elapsed() > max)
        {
            return Ok(Step::Stop(StopReason::TimedOut));
        }
        Ok(Step::Continue(next))
    }

    /// Waits between generations; local cancellation cuts the pause short.
    async fn pace(&self) {
        match self.params.interval {
            Some(interval) => {
                let sleep = time::sleep(interval);
                tokio::pin!(sleep);
                tokio::select! {
                    _ = &mut sleep => {}
                    _ = self.token.cancelled() => {}
                }
            }
            None => tokio::task::yield_now().await,
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
