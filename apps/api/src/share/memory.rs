//! In-memory share store. Does not survive restarts.
//!
//! Expiry is checked on every read under the lock; `sweep_expired` evicts
//! dead records and is driven by the background sweeper in `main`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::portfolio::models::Generation;
use crate::share::{ShareStore, StoreError, SHARE_TTL};

struct StoredShare {
    generation: Generation,
    expires_at: Instant,
}

#[derive(Clone)]
pub struct MemoryShareStore {
    records: Arc<RwLock<HashMap<String, StoredShare>>>,
    ttl: Duration,
}

impl MemoryShareStore {
    pub fn new() -> Self {
        Self::with_ttl(SHARE_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Removes every expired record. Returns how many were evicted.
    pub async fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, share| share.expires_at > now);
        before - records.len()
    }

    pub(crate) async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for MemoryShareStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ShareStore for MemoryShareStore {
    async fn put(&self, id: &str, generation: &Generation) -> Result<(), StoreError> {
        let share = StoredShare {
            generation: generation.clone(),
            expires_at: Instant::now() + self.ttl,
        };
        self.records.write().await.insert(id.to_string(), share);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Generation>, StoreError> {
        let records = self.records.read().await;
        Ok(records
            .get(id)
            .filter(|share| share.expires_at > Instant::now())
            .map(|share| share.generation.clone()))
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
