use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use log::{debug, error};
use redis::{AsyncCommands, IntoConnectionInfo};
use tokio::sync::RwLock;

use crate::config::StoreCredentials;
use crate::errors::WikiError;

/// Key-value backend holding encoded pages
#[async_trait]
pub trait PageStore: Send + Sync {
    /// Value stored under `key`, `None` when the key is absent
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WikiError>;

    /// Store `value` under `key` without expiry, replacing any previous value
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), WikiError>;
}

/// Redis backend. Every call opens its own connection and drops it on return.
pub struct RedisStore {
    client: redis::Client,
}

impl RedisStore {
    pub fn new(credentials: &StoreCredentials) -> Result<Self, WikiError> {
        let mut info = (credentials.host.as_str(), credentials.port).into_connection_info()?;
        info.redis.password = credentials.password.clone();
        info.redis.db = 0;
        let client = redis::Client::open(info)?;
        debug!("Created RedisStore for {}:{}", credentials.host, credentials.port);
        Ok(Self { client })
    }

    async fn connect(&self) -> Result<redis::aio::MultiplexedConnection, WikiError> {
        self.client.get_multiplexed_async_connection().await.map_err(|e| {
            error!("Failed to connect to redis: {}", e);
            WikiError::from(e)
        })
    }
}

#[async_trait]
impl PageStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WikiError> {
        let mut conn = self.connect().await?;
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), WikiError> {
        let mut conn = self.connect().await?;
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }
}

/// In-process backend for tests and local runs.
///
/// Clones share the same map. [`MemoryStore::set_offline`] makes every call
/// fail the way an unreachable server would.
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<(), WikiError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(WikiError::Store("memory store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, WikiError> {
        self.check_online()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), WikiError> {
        self.check_online()?;
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_overwrites() {
        let store = MemoryStore::new();
        assert_eq!(store.get("Bob").await.unwrap(), None);
        store.set("Bob", b"v1".to_vec()).await.unwrap();
        store.set("Bob", b"v2".to_vec()).await.unwrap();
        assert_eq!(store.get("Bob").await.unwrap(), Some(b"v2".to_vec()));
    }

    #[tokio::test]
    async fn offline_memory_store_fails_both_ways() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.set_offline(true);
        assert!(matches!(store.get("x").await, Err(WikiError::Store(_))));
        assert!(matches!(store.set("x", Vec::new()).await, Err(WikiError::Store(_))));
        handle.set_offline(false);
        assert!(store.set("x", Vec::new()).await.is_ok());
    }

    #[test]
    fn redis_store_builds_without_connecting() {
        let credentials = StoreCredentials {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: Some("secret".to_string()),
        };
        assert!(RedisStore::new(&credentials).is_ok());
    }
}
