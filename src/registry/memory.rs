//! # In-process registry with per-key expiry.
//!
//! [`MemoryRegistry`] keeps entries in a map guarded by an async `RwLock`.
//! Expiry uses [`tokio::time::Instant`], so tests running with a paused
//! clock observe ttl expiry deterministically.
//!
//! ## Rules
//! - Expired entries read as absent.
//! - Every 64th insert sweeps all expired entries, so keys that
//!   are never written again (one `cancelled:<job>` per job) do not pile up.
//! - [`purge_expired`](MemoryRegistry::purge_expired) evicts eagerly.
//! - `set_if_absent` and `delete_if_eq` hold the write lock across both
//!   halves, so they are atomic within one process.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::error::RegistryError;

use super::JobRegistry;

/// Inserts between two sweeps of expired entries.
const SWEEP_EVERY: usize = 64;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn new(value: &str, ttl: Duration) -> Self {
        Self {
            value: value.to_owned(),
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-process [`JobRegistry`].
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    entries: RwLock<HashMap<String, Entry>>,
    inserts: AtomicUsize,
}

impl MemoryRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evicts every expired entry; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| e.is_live(now));
        before - entries.len()
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live(now))
            .count()
    }

    /// True if no live entry exists.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Drops expired entries on every `SWEEP_EVERY`th insert.
    fn sweep_if_due(&self, entries: &mut HashMap<String, Entry>, now: Instant) {
        let n = self.inserts.fetch_add(1, Ordering::Relaxed) + 1;
        if n % SWEEP_EVERY == 0 {
            entries.retain(|_, e| e.is_live(now));
        }
    }

    #[cfg(test)]
    async fn raw_len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Remaining lifetime of `key`, if live.
    pub async fn ttl(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.expires_at - now)
    }
}

#[async_trait]
impl JobRegistry for MemoryRegistry {
    async fn get(&self, key: &str) -> Result<Option<String>, RegistryError> {
        let now = Instant::now();
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|e| e.is_live(now))
            .map(|e| e.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), RegistryError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        self.sweep_if_due(&mut entries, now);
        let _ = entries.insert(key.to_owned(), Entry::new(value, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RegistryError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        Ok(entries.remove(key).is_some_and(|e| e.is_live(now)))
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<Option<String>, RegistryError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        if let Some(e) = entries.get(key).filter(|e| e.is_live(now)) {
            return Ok(Some(e.value.clone()));
        }
        self.sweep_if_due(&mut entries, now);
        let _ = entries.insert(key.to_owned(), Entry::new(value, ttl));
        Ok(None)
    }

    async fn delete_if_eq(&self, key: &str, expected: &str) -> Result<bool, RegistryError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let state = entries
            .get(key)
            .map(|e| (e.is_live(now), e.value == expected));
        match state {
            Some((true, true)) => {
                let _ = entries.remove(key);
                Ok(true)
            }
            Some((false, _)) => {
                let _ = entries.remove(key);
                Ok(false)
            }
            _ => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let reg = MemoryRegistry::new();
        reg.set("k", "v", Duration::from_secs(10)).await.unwrap();
        assert_eq!(reg.get("k").await.unwrap().as_deref(), Some("v"));

        tokio::time::advance(Duration::from_secs(9)).await;
        assert_eq!(reg.ttl("k").await, Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(reg.get("k").await.unwrap(), None);
        assert!(!reg.delete("k").await.unwrap(), "expired entry is not a live delete");
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entry_does_not_block_set_if_absent() {
        let reg = MemoryRegistry::new();
        assert_eq!(reg.set_if_absent("k", "old", HOUR).await.unwrap(), None);
        tokio::time::advance(HOUR).await;
        assert_eq!(reg.set_if_absent("k", "new", HOUR).await.unwrap(), None);
        assert_eq!(reg.get("k").await.unwrap().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn delete_if_eq_only_removes_matching_value() {
        let reg = MemoryRegistry::new();
        reg.set("k", "job-2", HOUR).await.unwrap();
        assert!(!reg.delete_if_eq("k", "job-1").await.unwrap());
        assert_eq!(reg.get("k").await.unwrap().as_deref(), Some("job-2"));
        assert!(reg.delete_if_eq("k", "job-2").await.unwrap());
        assert!(!reg.delete_if_eq("k", "job-2").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn inserts_sweep_keys_that_are_never_rewritten() {
        let reg = MemoryRegistry::new();
        for i in 0..1000 {
            reg.set(&format!("cancelled:{i}"), "1", Duration::from_secs(1))
                .await
                .unwrap();
        }
        assert_eq!(reg.raw_len().await, 1000);

        tokio::time::advance(Duration::from_secs(10)).await;
        for _ in 0..SWEEP_EVERY {
            reg.set("active_job:u", "j", HOUR).await.unwrap();
        }
        assert_eq!(reg.raw_len().await, 1);
        assert_eq!(reg.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn purge_counts_only_expired() {
        let reg = MemoryRegistry::new();
        reg.set("short", "1", Duration::from_secs(1)).await.unwrap();
        reg.set("long", "1", HOUR).await.unwrap();
        tokio::time::advance(Duration::from_secs(2)).await;

        assert_eq!(reg.purge_expired().await, 1);
        assert_eq!(reg.len().await, 1);
        assert!(!reg.is_empty().await);
    }
}
