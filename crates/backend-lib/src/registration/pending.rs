// ============================
// crates/backend-lib/src/registration/pending.rs
// ============================
//! Pending-registration TTL store.
use std::{collections::HashMap, sync::Arc, time::{Duration, Instant}};

use async_trait::async_trait;
use metrics::{counter, gauge};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::AppError;

/// Sweep interval for the expiry task
const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// A registration awaiting email confirmation. The plaintext password
/// lives only here and only until finalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub email: String,
    pub username: String,
    pub password: String,
}

/** Trait for the TTL key-value mailbox keyed by verification code.

Keys are opaque strings; values are opaque serialized bytes. `reserve`
inserts only when the key is vacant, so two registrations that draw the
same code never overwrite each other - the loser redraws. */
#[async_trait]
pub trait PendingStore: Send + Sync {
    /// Insert `value` under `code` if the key is vacant. Returns `false`
    /// when a live entry already holds the code.
    async fn reserve(&self, code: &str, value: Vec<u8>, ttl: Duration) -> Result<bool, AppError>;

    /// Non-consuming read. Expired entries read as absent.
    async fn get(&self, code: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// Positively invalidate a code after a successful confirm
    async fn remove(&self, code: &str) -> Result<(), AppError>;
}

struct Entry {
    value: Vec<u8>,
    expires_at: Instant,
}

/// In-memory implementation of the `PendingStore` trait
#[derive(Clone)]
pub struct InMemoryPendingStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryPendingStore {
    /// Create a new store and spawn its expiry sweep task
    pub fn new() -> Self {
        let store = InMemoryPendingStore {
            entries: Arc::new(RwLock::new(HashMap::new())),
        };

        let store_clone = store.clone();
        tokio::spawn(async move {
            store_clone.sweep_task().await;
        });

        store
    }

    /// Periodically drop entries whose deadline has passed. Correctness
    /// does not depend on the sweep; reads treat expired entries as absent.
    async fn sweep_task(&self) {
        loop {
            tokio::time::sleep(SWEEP_INTERVAL).await;

            let mut entries = self.entries.write().await;
            let now = Instant::now();
            let before = entries.len();

            entries.retain(|_, entry| now < entry.expires_at);

            let removed = before - entries.len();
            if removed > 0 {
                counter!("registration.pending_expired").increment(removed as u64);
                gauge!("registration.pending_active").set(entries.len() as f64);
            }
        }
    }
}

impl Default for InMemoryPendingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PendingStore for InMemoryPendingStore {
    async fn reserve(&self, code: &str, value: Vec<u8>, ttl: Duration) -> Result<bool, AppError> {
        let mut entries = self.entries.write().await;
        let now = Instant::now();

        if let Some(existing) = entries.get(code) {
            if now < existing.expires_at {
                return Ok(false);
            }
        }

        entries.insert(
            code.to_string(),
            Entry {
                value,
                expires_at: now + ttl,
            },
        );

        counter!("registration.pending_created").increment(1);
        gauge!("registration.pending_active").set(entries.len() as f64);

        Ok(true)
    }

    async fn get(&self, code: &str) -> Result<Option<Vec<u8>>, AppError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(code)
            .filter(|entry| Instant::now() < entry.expires_at)
            .map(|entry| entry.value.clone()))
    }

    async fn remove(&self, code: &str) -> Result<(), AppError> {
        let mut entries = self.entries.write().await;
        entries.remove(code);
        gauge!("registration.pending_active").set(entries.len() as f64);
        Ok(())
    }
}
