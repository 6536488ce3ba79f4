//! Redis client storing JSON payloads under prefixed keys.

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;
use tracing::{debug, error, instrument};

use crate::CacheConfig;

#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    key_prefix: String,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RedisCache {
    pub async fn new(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self, CacheError> {
        let client = Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            key_prefix: key_prefix.into(),
        })
    }

    /// Connects when `REDIS_URL` is configured. A failed connection is logged
    /// and the application carries on without a cache.
    pub async fn from_config(config: &CacheConfig) -> Option<Self> {
        let url = config.redis_url.as_deref()?;
        match Self::new(url, config.key_prefix.clone()).await {
            Ok(cache) => {
                tracing::info!("Redis cache connected");
                Some(cache)
            }
            Err(e) => {
                error!(error = %e, "Redis unavailable, dashboard cache disabled");
                None
            }
        }
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }

    /// Returns `None` on a miss, a Redis error or an undecodable payload.
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.conn.clone();
        let key = self.full_key(key);

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(value)) => {
                debug!(cache.key = %key, "Cache hit");
                match serde_json::from_str(&value) {
                    Ok(parsed) => Some(parsed),
                    Err(e) => {
                        error!(cache.key = %key, error = %e, "Failed to deserialize cached value");
                        None
                    }
                }
            }
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                None
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis GET error");
                None
            }
        }
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    pub async fn set_with_ttl<T>(&self, key: &str, value: &T, ttl: Duration) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.conn.clone();
        let key = self.full_key(key);
        let json = serde_json::to_string(value)?;

        conn.set_ex::<_, _, ()>(&key, json, ttl.as_secs().max(1))
            .await?;

        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");

        Ok(())
    }

    /// Deletes every key matching `pattern` (relative to the prefix) using SCAN.
    #[instrument(skip(self), fields(cache.operation = "SCAN_DEL"))]
    pub async fn invalidate_pattern(&self, pattern: &str) -> Result<u64, CacheError> {
        let mut conn = self.conn.clone();
        let pattern = self.full_key(pattern);
        let mut cursor: u64 = 0;
        let mut deleted: u64 = 0;

        loop {
            let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await?;

            if !keys.is_empty() {
                let count: u64 = conn.del(&keys).await?;
                deleted += count;
            }

            cursor = next_cursor;
            if cursor == 0 {
                break;
            }
        }

        debug!(cache.pattern = %pattern, cache.deleted = %deleted, "Pattern invalidation complete");

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        total: i64,
        label: String,
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn set_get_and_invalidate() {
        let cache = RedisCache::new("redis://localhost:6379", "mesrs-test")
            .await
            .unwrap();

        let data = Payload {
            total: 42,
            label: "Nouakchott".to_string(),
        };

        cache
            .set_with_ttl("dashboard:stats:fr", &data, Duration::from_secs(30))
            .await
            .unwrap();

        let cached: Option<Payload> = cache.get("dashboard:stats:fr").await;
        assert_eq!(cached, Some(data));

        cache.invalidate_pattern("dashboard:*").await.unwrap();
        let cached: Option<Payload> = cache.get("dashboard:stats:fr").await;
        assert!(cached.is_none());
    }
}
