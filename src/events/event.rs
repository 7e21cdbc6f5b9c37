//! # Events pushed to a user's topic.
//!
//! Two shapes cross the push boundary, distinguished by a `type` tag:
//!
//! ```text
//! {"type":"grid_update","grid":[[{"alive":true,"age":0}, ...], ...],"timestamp":1718000000}
//! {"type":"job_status","status":"running","job_id":"0190...","message":"started"}
//! ```
//!
//! `status` is one of `running`, `idle`, `error`. Error messages carry the
//! human-readable failure text only.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::core::JobId;
use crate::error::BroadcastError;
use crate::grid::Grid;

/// Coarse job status reported to subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// A job is computing generations.
    Running,
    /// No job is computing (stopped, converged, timed out).
    Idle,
    /// The job failed.
    Error,
}

impl JobStatus {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Idle => "idle",
            JobStatus::Error => "error",
        }
    }
}

/// Event published on a user's topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum JobEvent {
    /// A freshly computed generation.
    GridUpdate {
        /// The new board.
        grid: Arc<Grid>,
        /// Unix seconds at publish time.
        timestamp: u64,
    },

    /// A job lifecycle change.
    JobStatus {
        /// Coarse status.
        status: JobStatus,
        /// Job the status refers to.
        job_id: JobId,
        /// Human-readable detail (`started`, `stopped`, error text, ...).
        message: String,
    },
}

impl JobEvent {
    /// Creates a `grid_update` stamped with the current wall-clock time.
    pub fn grid_update(grid: Arc<Grid>) -> Self {
        JobEvent::GridUpdate {
            grid,
            timestamp: unix_now(),
        }
    }

    /// Creates a `job_status` event.
    pub fn status(status: JobStatus, job_id: &JobId, message: impl Into<String>) -> Self {
        JobEvent::JobStatus {
            status,
            job_id: job_id.clone(),
            message: message.into(),
        }
    }

    /// Wire `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            JobEvent::GridUpdate { .. } => "grid_update",
            JobEvent::JobStatus { .. } => "job_status",
        }
    }

    /// Status carried by a `job_status` event.
    pub fn job_status(&self) -> Option<JobStatus> {
        match self {
            JobEvent::JobStatus { status, .. } => Some(*status),
            JobEvent::GridUpdate { .. } => None,
        }
    }

    /// Message carried by a `job_status` event.
    pub fn message(&self) -> Option<&str> {
        match self {
            JobEvent::JobStatus { message, .. } => Some(message),
            JobEvent::GridUpdate { .. } => None,
        }
    }

    /// Renders the wire JSON.
    pub fn to_json(&self) -> Result<String, BroadcastError> {
        serde_json::to_string(self).map_err(|e| BroadcastError::Encode {
            error: e.to_string(),
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_event_wire_shape() {
        let id = JobId::from("job-1");
        let ev = JobEvent::status(JobStatus::Running, &id, "already running");
        let value: serde_json::Value = serde_json::from_str(&ev.to_json().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "job_status",
                "status": "running",
                "job_id": "job-1",
                "message": "already running",
            })
        );
        assert_eq!(ev.kind(), "job_status");
        assert_eq!(ev.job_status(), Some(JobStatus::Running));
    }

    #[test]
    fn grid_update_wire_shape() {
        let grid = Arc::new(Grid::from_alive(1, 2, &[(0, 0)]).unwrap());
        let ev = JobEvent::grid_update(grid);
        let value = serde_json::to_value(&ev).unwrap();

        assert_eq!(value["type"], "grid_update");
        assert_eq!(
            value["grid"],
            json!([[{"alive": true, "age": 0}, {"alive": false, "age": 0}]])
        );
        assert!(value["timestamp"].as_u64().unwrap() > 0);
        assert_eq!(ev.message(), None);
    }

    #[test]
    fn events_parse_back() {
        let raw = r#"{"type":"job_status","status":"error","job_id":"j","message":"boom"}"#;
        let ev: JobEvent = serde_json::from_str(raw).unwrap();
        assert_eq!(ev.job_status(), Some(JobStatus::Error));
        assert_eq!(ev.message(), Some("boom"));
    }
}
