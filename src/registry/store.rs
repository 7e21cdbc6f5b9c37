//! # Registry capability.
//!
//! A store needs three primitives: [`get`](JobRegistry::get),
//! [`set`](JobRegistry::set) with a ttl, and [`delete`](JobRegistry::delete).
//! All of them must be safe to call concurrently from many jobs.
//!
//! The compound operations have get-then-act default implementations that
//! are **not** atomic. Stores that can do better (a `SET NX`, a scripted
//! compare-and-delete, a lock held across both halves) should override them;
//! [`MemoryRegistry`](super::MemoryRegistry) does.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::RegistryError;

/// Concurrent key/value store with per-key expiry.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use lifevisor::{JobRegistry, MemoryRegistry};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), lifevisor::RegistryError> {
/// let reg = MemoryRegistry::new();
/// assert_eq!(reg.set_if_absent("k", "a", Duration::from_secs(60)).await?, None);
/// assert_eq!(reg.set_if_absent("k", "b", Duration::from_secs(60)).await?, Some("a".into()));
/// assert!(!reg.delete_if_eq("k", "b").await?);
/// assert!(reg.delete_if_eq("k", "a").await?);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait JobRegistry: Send + Sync + 'static {
    /// Returns the live value for `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<String>, RegistryError>;

    /// Stores `value` under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RegistryError>;

    /// Removes `key`. Returns whether a live entry was removed.
    async fn delete(&self, key: &str) -> Result<bool, RegistryError>;

    /// Stores `value` only if `key` holds no live entry.
    ///
    /// Returns the existing value when the key was occupied, `None` when `value` was written.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<Option<String>, RegistryError> {
        if let Some(existing) = self.get(key).await? {
            return Ok(Some(existing));
        }
        self.set(key, value, ttl).await?;
        Ok(None)
    }

    /// Removes `key` only if it currently holds `expected`.
    async fn delete_if_eq(&self, key: &str, expected: &str) -> Result<bool, RegistryError> {
        match self.get(key).await? {
            Some(v) if v == expected => self.delete(key).await,
            _ => Ok(false),
        }
    }
}
