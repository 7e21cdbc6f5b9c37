//! Shared job registry: dedup guard and cancellation flags.
//!
//! The orchestrator never keeps these in process-local maps. It talks to a
//! [`JobRegistry`] capability, which may be backed by an external store shared
//! by many orchestrator instances.
//!
//! ## Keys
//! ```text
//! active_job:<user_id>  -> <job_id>   ttl = Config::active_job_ttl (1h)
//! cancelled:<job_id>    -> "1"        ttl = Config::cancel_ttl     (24h)
//! ```
//!
//! ## Contents
//! - [`JobRegistry`] get / set-with-ttl / delete, plus compound operations
//! - [`MemoryRegistry`] in-process store with per-key expiry

mod keys;
mod memory;
mod store;

pub use keys::{active_job_key, cancelled_key};
pub use memory::MemoryRegistry;
pub use store::JobRegistry;
