//! Redis Store Module
//!
//! Redis-backed implementation of [`KeyValueStore`]. A single
//! `ConnectionManager` is shared by every request and reconnects on its own
//! after transient failures; each command is bounded by a timeout.

use std::future::Future;
use std::time::Duration;

use ::redis::aio::ConnectionManager;
use ::redis::{AsyncCommands, Client};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{RegistryError, Result};
use crate::store::KeyValueStore;

/// Upper bound on establishing the initial connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

// == Redis Store ==
/// Redis store with a multiplexed, self-healing connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    op_timeout: Duration,
}

impl RedisStore {
    // == Open ==
    /// Connects to `url`, failing if the server is unreachable within the connect timeout.
    pub async fn open(url: &str, op_timeout: Duration) -> Result<Self> {
        let client = Client::open(url)
            .map_err(|e| RegistryError::StoreUnavailable(format!("Redis client error: {}", e)))?;

        let conn = tokio::time::timeout(CONNECT_TIMEOUT, ConnectionManager::new(client))
            .await
            .map_err(|_| {
                RegistryError::StoreUnavailable(format!(
                    "Redis connect timed out after {:?}",
                    CONNECT_TIMEOUT
                ))
            })?
            .map_err(|e| RegistryError::StoreUnavailable(format!("Redis connection error: {}", e)))?;

        info!("Connected to Redis");
        Ok(Self { conn, op_timeout })
    }

    /// Runs one command against a clone of the shared connection, bounded by the op timeout.
    async fn run<T, F, Fut>(&self, op: &'static str, f: F) -> Result<T>
    where
        F: FnOnce(ConnectionManager) -> Fut,
        Fut: Future<Output = ::redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.op_timeout, f(self.conn.clone())).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!("Redis {} failed: {}", op, e);
                Err(RegistryError::StoreUnavailable(format!("Redis {} error: {}", op, e)))
            }
            Err(_) => {
                warn!("Redis {} timed out after {:?}", op, self.op_timeout);
                Err(RegistryError::StoreUnavailable(format!(
                    "Redis {} timed out after {:?}",
                    op, self.op_timeout
                )))
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.run("GET", |mut conn| async move { conn.get(key).await })
            .await
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let secs = ttl.as_secs().max(1);
        self.run("SET", |mut conn| async move { conn.set_ex(key, value, secs).await })
            .await
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<usize> {
        self.run("LPUSH", |mut conn| async move { conn.lpush(key, value).await })
            .await
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        self.run("LTRIM", |mut conn| async move { conn.ltrim(key, start, stop).await })
            .await
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        self.run("LRANGE", |mut conn| async move { conn.lrange(key, start, stop).await })
            .await
    }

    /// `LPUSH` and `LTRIM` in one `MULTI/EXEC`, so the cap is never exceeded.
    async fn push_capped(&self, key: &str, value: &str, max: usize) -> Result<usize> {
        let (len,): (usize,) = self
            .run("LPUSH+LTRIM", |mut conn| async move {
                let mut pipe = ::redis::pipe();
                pipe.atomic()
                    .lpush(key, value)
                    .ltrim(key, 0, max as isize - 1)
                    .ignore();
                pipe.query_async(&mut conn).await
            })
            .await?;
        Ok(len.min(max))
    }

    async fn ping(&self) -> Result<String> {
        self.run("PING", |mut conn| async move {
            ::redis::cmd("PING").query_async(&mut conn).await
        })
        .await
    }

    async fn close(&self) -> Result<()> {
        // ConnectionManager closes its socket when the last clone drops
        info!("Closing Redis connection");
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
