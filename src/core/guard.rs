//! # Scoped ownership of the `active_job` entry.
//!
//! [`ActiveJobGuard`] is created when `submit` installs `active_job:<user>`
//! and moves into the job task. Every exit of the loop funnels through
//! [`release`](ActiveJobGuard::release). If the task is dropped before that
//! (aborted on shutdown, runtime torn down mid-await) `Drop` spawns the
//! release instead.
//!
//! Release is compare-and-delete: the entry is removed only while it still
//! names this job, so a job never deletes a newer job's guard.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::core::{JobId, UserId};
use crate::error::RegistryError;
use crate::registry::{JobRegistry, active_job_key};

/// Owner of one `active_job:<user> -> <job>` entry.
pub(crate) struct ActiveJobGuard {
    registry: Arc<dyn JobRegistry>,
    key: String,
    job_id: JobId,
    armed: bool,
}

impl ActiveJobGuard {
    pub(crate) fn new(registry: Arc<dyn JobRegistry>, user: &UserId, job_id: &JobId) -> Self {
        Self {
            registry,
            key: active_job_key(user.as_str()),
            job_id: job_id.clone(),
            armed: true,
        }
    }

    /// Removes the entry if it still names this job.
    ///
    /// Returns whether anything was removed.
    pub(crate) async fn release(mut self) -> Result<bool, RegistryError> {
        let res = self
            .registry
            .delete_if_eq(&self.key, self.job_id.as_str())
            .await;
        self.armed = false;
        res
    }
}

impl Drop for ActiveJobGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let registry = Arc::clone(&self.registry);
        let key = std::mem::take(&mut self.key);
        let job_id = self.job_id.clone();

        match tokio::runtime::Handle::try_current() {
            Ok(rt) => {
                drop(rt.spawn(async move {
                    match registry.delete_if_eq(&key, job_id.as_str()).await {
                        Ok(removed) => debug!(%job_id, removed, "active job released on drop"),
                        Err(e) => warn!(%job_id, error = %e, "failed to release active job on drop"),
                    }
                }));
            }
            Err(_) => {
                warn!(%job_id, "no runtime to release active job; entry left to expire");
            }
        }
    }
}
