use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::portfolio::models::Generation;
use crate::share::{ShareStore, StoreError, SHARE_TTL};

const KEY_PREFIX: &str = "gen:";

/// Redis-backed share store. Expiry is delegated to Redis via `SET ... EX`.
#[derive(Clone)]
pub struct RedisShareStore {
    client: redis::Client,
}

impl RedisShareStore {
    pub fn new(client: redis::Client) -> Self {
        Self { client }
    }
}

fn share_key(id: &str) -> String {
    format!("{KEY_PREFIX}{id}")
}

#[async_trait]
impl ShareStore for RedisShareStore {
    async fn put(&self, id: &str, generation: &Generation) -> Result<(), StoreError> {
        let payload = serde_json::to_string(generation)?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.set_ex::<_, _, ()>(share_key(id), payload, SHARE_TTL.as_secs())
            .await?;
        debug!("Stored share {id} in Redis");
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Generation>, StoreError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(share_key(id)).await?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
