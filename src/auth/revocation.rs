//! Liveness registry for refresh tokens.
//!
//! A refresh token is live only while its string is present here. Entries
//! carry a TTL equal to the refresh lifetime, so expiry is the store's job.

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache as MokaCache;
use std::time::{Duration, Instant};

use crate::error::Result;
#[cfg(feature = "redis")]
use crate::error::WardenError;

/// Key-value store with per-entry TTL.
///
/// Single-key operations must be atomic. Deleting an absent key is not an
/// error.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn del(&self, key: &str) -> Result<()>;

    /// Check if the backend is reachable
    async fn is_healthy(&self) -> bool {
        true
    }
}

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_read(
        &self,
        _key: &String,
        _value: &Entry,
        _read_at: Instant,
        duration_until_expiry: Option<Duration>,
        _last_modified_at: Instant,
    ) -> Option<Duration> {
        // TTL, not TTI
        duration_until_expiry
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process revocation store backed by moka.
///
/// Suitable for tests and single-instance deployments. State is lost on
/// restart, which revokes every outstanding refresh token.
///
/// The cache has no size bound: an entry leaves only through its TTL or
/// `del`, never through eviction.
#[derive(Clone)]
pub struct InMemoryRevocationStore {
    inner: MokaCache<String, Entry>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        let inner = MokaCache::builder().expire_after(EntryExpiry).build();
        Self { inner }
    }

    pub async fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }
}

impl Default for InMemoryRevocationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let entry = Entry {
            value: value.to_string(),
            ttl,
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.get(key).await.map(|e| e.value))
    }

    async fn del(&self, key: &str) -> Result<()> {
        self.inner.remove(key).await;
        Ok(())
    }
}

/// Redis-backed revocation store using `SETEX`/`GET`/`DEL`.
#[cfg(feature = "redis")]
#[derive(Clone)]
pub struct RedisRevocationStore {
    client: redis::Client,
    key_prefix: String,
}

#[cfg(feature = "redis")]
impl RedisRevocationStore {
    pub fn new(url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| WardenError::store(format!("Failed to create Redis client: {}", e)))?;

        Ok(Self {
            client,
            key_prefix: key_prefix.into(),
        })
    }

    fn key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| WardenError::store(format!("Failed to get Redis connection: {}", e)))
    }
}

#[cfg(feature = "redis")]
#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.get_connection().await?;

        // SETEX rejects a zero TTL
        let ttl_secs = ttl.as_secs().max(1);
        redis::cmd("SETEX")
            .arg(self.key(key))
            .arg(ttl_secs)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| WardenError::store(format!("Redis SETEX failed: {}", e)))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;

        let value = redis::cmd("GET")
            .arg(self.key(key))
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(|e| WardenError::store(format!("Redis GET failed: {}", e)))?;

        Ok(value)
    }

    async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;

        redis::cmd("DEL")
            .arg(self.key(key))
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| WardenError::store(format!("Redis DEL failed: {}", e)))?;

        Ok(())
    }

    async fn is_healthy(&self) -> bool {
        let Ok(mut conn) = self.get_connection().await else {
            return false;
        };
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_del() {
        let store = InMemoryRevocationStore::new();
        store.set("tok", "alice", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("tok").await.unwrap(), Some("alice".to_string()));

        store.del("tok").await.unwrap();
        assert_eq!(store.get("tok").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_del_absent_key_is_ok() {
        let store = InMemoryRevocationStore::new();
        assert!(store.del("never-set").await.is_ok());
        assert!(store.del("never-set").await.is_ok());
    }

    #[tokio::test]
    async fn test_entry_expires() {
        let store = InMemoryRevocationStore::new();
        store
            .set("short", "alice", Duration::from_millis(20))
            .await
            .unwrap();
        store
            .set("long", "alice", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(store.get("short").await.unwrap(), None);
        assert_eq!(store.get("long").await.unwrap(), Some("alice".to_string()));
    }

    #[tokio::test]
    async fn test_no_entry_is_evicted_by_volume() {
        let store = InMemoryRevocationStore::new();
        for i in 0..2_000 {
            store
                .set(&format!("tok-{}", i), "alice", Duration::from_secs(60))
                .await
                .unwrap();
        }

        assert_eq!(store.entry_count().await, 2_000);
        for i in 0..2_000 {
            assert!(store.get(&format!("tok-{}", i)).await.unwrap().is_some());
        }
    }

    #[tokio::test]
    async fn test_in_memory_is_healthy() {
        assert!(InMemoryRevocationStore::default().is_healthy().await);
    }

    #[cfg(feature = "redis")]
    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_redis_store() {
        let store = RedisRevocationStore::new("redis://127.0.0.1/", "warden:test:").unwrap();
        assert!(store.is_healthy().await);

        store.set("tok", "alice", Duration::from_secs(60)).await.unwrap();
        assert_eq!(store.get("tok").await.unwrap(), Some("alice".to_string()));

        store.del("tok").await.unwrap();
        store.del("tok").await.unwrap();
        assert_eq!(store.get("tok").await.unwrap(), None);
    }
}
