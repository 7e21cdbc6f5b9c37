//! Push events and the per-user topic broadcaster.
//!
//! This module groups the event **data model** pushed to subscribers and the
//! **transport seam** the orchestrator publishes through.
//!
//! ## Contents
//! - [`JobEvent`], [`JobStatus`] wire events (`grid_update`, `job_status`)
//! - [`Broadcast`] fire-and-forget `publish(topic, event)` capability
//! - [`TopicBus`] in-process implementation over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Orchestrator::submit` / `cancel` (status events) and the
//!   job loop (one `grid_update` per generation, one terminal status).
//! - **Consumers**: whatever transport routes a user's topic to their socket.
//!   In process that is a [`TopicBus::subscribe`] receiver.

mod bus;
mod event;

pub use bus::{Broadcast, TopicBus, topic_for};
pub use event::{JobEvent, JobStatus};
