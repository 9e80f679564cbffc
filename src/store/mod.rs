//! Store Module
//!
//! The shared key-value abstraction both the signature cache and the upload
//! registry sit on. One handle is opened at startup and shared by `Arc`.

mod entry;
mod memory;
mod redis_store;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

pub use entry::{current_timestamp_ms, StoreEntry, StoredValue};
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Shared store handle passed to every component.
pub type SharedStore = Arc<dyn KeyValueStore>;

// == Key Value Store ==
/// The subset of Redis commands this service relies on.
///
/// Ranges follow Redis semantics: `start` and `stop` are inclusive and
/// negative indices count from the tail.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `GET key`. Absent and expired keys yield `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// `SET key value EX ttl`. A zero `ttl` is raised to one second.
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// `LPUSH key value`, returning the new list length.
    async fn lpush(&self, key: &str, value: &str) -> Result<usize>;

    /// `LTRIM key start stop`.
    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()>;

    /// `LRANGE key start stop`.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>>;

    /// Pushes `value` at the head and trims the list to `max` entries.
    ///
    /// The default runs two separate commands, so concurrent writers may see
    /// a brief overshoot. Backends override it when they can do both at once.
    async fn push_capped(&self, key: &str, value: &str, max: usize) -> Result<usize> {
        let len = self.lpush(key, value).await?;
        self.ltrim(key, 0, max as isize - 1).await?;
        Ok(len.min(max))
    }

    /// Liveness probe.
    async fn ping(&self) -> Result<String>;

    /// Releases the underlying connection. Called once at shutdown.
    async fn close(&self) -> Result<()> {
        Ok(())
    }

    /// Short backend name for logs.
    fn backend(&self) -> &'static str;
}

// == Range Resolution ==
/// Resolves a Redis-style inclusive range against a list of `len` items.
///
/// Returns `None` when the range selects nothing.
pub fn resolve_range(len: usize, start: isize, stop: isize) -> Option<(usize, usize)> {
    if len == 0 {
        return None;
    }
    let len_i = len as isize;
    let start = if start < 0 { (len_i + start).max(0) } else { start };
    let stop = if stop < 0 { len_i + stop } else { stop.min(len_i - 1) };

    if start > stop || start >= len_i || stop < 0 {
        return None;
    }
    Some((start as usize, stop as usize))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_range_basic() {
        assert_eq!(resolve_range(10, 0, 2), Some((0, 2)));
        assert_eq!(resolve_range(10, 8, 13), Some((8, 9)));
        assert_eq!(resolve_range(10, 10, 15), None);
    }

    #[test]
    fn test_resolve_range_negative_indices() {
        assert_eq!(resolve_range(5, 0, -1), Some((0, 4)));
        assert_eq!(resolve_range(5, -2, -1), Some((3, 4)));
        assert_eq!(resolve_range(5, -10, 1), Some((0, 1)));
        assert_eq!(resolve_range(5, 0, -6), None);
    }

    #[test]
    fn test_resolve_range_empty_or_inverted() {
        assert_eq!(resolve_range(0, 0, -1), None);
        assert_eq!(resolve_range(5, 3, 2), None);
    }
}
