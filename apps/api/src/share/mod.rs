//! Share Store — time-limited persistence of generations behind opaque ids.
//!
//! `AppState` holds an `Arc<dyn ShareStore>`: Redis when `REDIS_URL` is set,
//! otherwise the process-local `MemoryShareStore`.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::portfolio::models::Generation;

pub mod memory;
pub mod redis_store;

pub use memory::MemoryShareStore;
pub use redis_store::RedisShareStore;

/// How long a shared generation stays retrievable.
pub const SHARE_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait ShareStore: Send + Sync {
    /// Stores `generation` under `id` with `SHARE_TTL`. Overwrites silently.
    async fn put(&self, id: &str, generation: &Generation) -> Result<(), StoreError>;

    /// Returns the generation, or `None` if it expired or was never written.
    async fn get(&self, id: &str) -> Result<Option<Generation>, StoreError>;

    /// Human-readable backend name for logs.
    fn backend(&self) -> &'static str;
}

/// Opaque, globally unique share id.
pub fn new_share_id() -> String {
    Uuid::new_v4().to_string()
}

/// Stores `generation` under a fresh id and returns the id.
pub async fn save_share(
    store: &dyn ShareStore,
    generation: &Generation,
) -> Result<String, StoreError> {
    let id = new_share_id();
    store.put(&id, generation).await?;
    info!("Saved share {id} ({} backend)", store.backend());
    Ok(id)
}
