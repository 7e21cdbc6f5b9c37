//! # Per-topic event broadcasting.
//!
//! [`Broadcast`] is the seam the orchestrator publishes through. The bundled
//! [`TopicBus`] keeps one [`tokio::sync::broadcast`] channel per topic.
//!
//! ## Architecture
//! ```text
//! Publishers (many):                     Subscribers (per topic):
//!   submit/cancel ──┐
//!   job loop 1    ──┼──► TopicBus ─┬─► "…_user_1" ──► rx, rx, ...
//!   job loop N    ──┘              └─► "…_user_2" ──► rx
//! ```
//!
//! ## Rules
//! - **Fire-and-forget**: no acknowledgement; an event published while a topic
//!   has no receivers is dropped.
//! - **Per-topic order**: events from one publisher arrive in publish order.
//!   There is no ordering across topics.
//! - **Bounded**: each topic keeps at most `capacity` recent events; slow
//!   receivers get `RecvError::Lagged(n)` and skip the `n` oldest.
//! - Channels are created on first subscribe and dropped once a publish finds
//!   no receivers left.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{RwLock, broadcast};
use tracing::trace;

use crate::error::BroadcastError;

use super::JobEvent;

/// Topic name for `user` under `prefix`.
///
/// ```
/// assert_eq!(lifevisor::topic_for("game_of_life_channel_user_", "7"), "game_of_life_channel_user_7");
/// ```
pub fn topic_for(prefix: &str, user: &str) -> String {
    format!("{prefix}{user}")
}

/// Push transport.
#[async_trait]
pub trait Broadcast: Send + Sync + 'static {
    /// Publishes `event` on `topic`.
    ///
    /// Returns once the transport has accepted the event. An `Err` means it
    /// was refused; delivery is never acknowledged.
    async fn publish(&self, topic: &str, event: JobEvent) -> Result<(), BroadcastError>;
}

/// In-process broadcaster with one bounded channel per topic.
///
/// Cheap to share behind an `Arc`.
#[derive(Debug)]
pub struct TopicBus {
    capacity: usize,
    topics: RwLock<HashMap<String, broadcast::Sender<Arc<JobEvent>>>>,
}

impl TopicBus {
    /// Creates a bus whose topic channels hold `capacity` events (min 1).
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            topics: RwLock::new(HashMap::new()),
        }
    }

    /// Creates a receiver for events published on `topic` after this call.
    pub async fn subscribe(&self, topic: &str) -> broadcast::Receiver<Arc<JobEvent>> {
        let mut topics = self.topics.write().await;
        topics
            .entry(topic.to_owned())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Number of topics with a live channel.
    pub async fn topic_count(&self) -> usize {
        self.topics.read().await.len()
    }

    async fn drop_if_unobserved(&self, topic: &str) {
        let mut topics = self.topics.write().await;
        if topics.get(topic).is_some_and(|tx| tx.receiver_count() == 0) {
            let _ = topics.remove(topic);
        }
    }
}

impl Default for TopicBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

#[async_trait]
impl Broadcast for TopicBus {
    async fn publish(&self, topic: &str, event: JobEvent) -> Result<(), BroadcastError> {
        let delivered = {
            let topics = self.topics.read().await;
            match topics.get(topic) {
                Some(tx) => tx.send(Arc::new(event)).is_ok(),
                None => false,
            }
        };
        if !delivered {
            trace!(topic, "no subscribers; event dropped");
            self.drop_if_unobserved(topic).await;
        }
        Ok(())
    }
}
