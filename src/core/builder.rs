use std::sync::Arc;

use crate::{
    core::Config,
    events::{Broadcast, TopicBus},
    registry::{JobRegistry, MemoryRegistry},
};

use super::orchestrator::Orchestrator;

/// Builder for constructing an [`Orchestrator`] with injected collaborators.
pub struct OrchestratorBuilder {
    cfg: Config,
    registry: Option<Arc<dyn JobRegistry>>,
    broadcaster: Option<Arc<dyn Broadcast>>,
}

impl OrchestratorBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            registry: None,
            broadcaster: None,
        }
    }

    /// Sets the shared store holding dedup guards and cancellation flags.
    ///
    /// Orchestrators that must see each other's jobs have to share one store.
    /// Defaults to a private [`MemoryRegistry`].
    pub fn with_registry(mut self, registry: Arc<dyn JobRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the push transport for per-user topics.
    ///
    /// Defaults to a private [`TopicBus`] sized by `Config::bus_capacity`,
    /// which nobody can subscribe to; pass a shared one to observe events.
    pub fn with_broadcaster(mut self, broadcaster: Arc<dyn Broadcast>) -> Self {
        self.broadcaster = Some(broadcaster);
        self
    }

    /// Builds and returns the Orchestrator instance.
    pub fn build(self) -> Arc<Orchestrator> {
        let registry: Arc<dyn JobRegistry> = match self.registry {
            Some(r) => r,
            None => Arc::new(MemoryRegistry::new()),
        };
        let broadcaster: Arc<dyn Broadcast> = match self.broadcaster {
            Some(b) => b,
            None => Arc::new(TopicBus::new(self.cfg.bus_capacity_clamped())),
        };

        Arc::new(Orchestrator::new_internal(self.cfg, registry, broadcaster))
    }
}
