//! Memory Store Module
//!
//! In-process key-value store with string entries (TTL) and lists.
//! Used when no Redis URL is configured, and throughout the tests.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{RegistryError, Result};
use crate::store::{current_timestamp_ms, resolve_range, KeyValueStore, StoreEntry, StoredValue};

/// Expiry applied when a caller asks for a zero TTL.
const MIN_TTL: Duration = Duration::from_secs(1);

// == Memory Store ==
/// HashMap-backed store guarded by a single async lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, StoreEntry>>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the store.
    ///
    /// Returns the number of entries removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = current_timestamp_ms();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired_at(now));
        before - entries.len()
    }

    // == Length ==
    /// Returns the number of live keys, expired ones included until swept.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    // == Is Empty ==
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn wrong_type(key: &str, found: &StoredValue) -> RegistryError {
    RegistryError::Internal(format!(
        "WRONGTYPE key '{}' holds a {} value",
        key,
        found.type_name()
    ))
}

/// Drops `key` if it has expired, so the caller sees it as absent.
fn purge_expired(entries: &mut HashMap<String, StoreEntry>, key: &str) {
    if entries.get(key).is_some_and(|e| e.is_expired()) {
        entries.remove(key);
    }
}

fn push_head(entries: &mut HashMap<String, StoreEntry>, key: &str, value: &str) -> Result<usize> {
    purge_expired(entries, key);
    let entry = entries
        .entry(key.to_string())
        .or_insert_with(StoreEntry::list);
    match &mut entry.value {
        StoredValue::List(list) => {
            list.push_front(value.to_string());
            Ok(list.len())
        }
        other => Err(wrong_type(key, other)),
    }
}

fn trim(entries: &mut HashMap<String, StoreEntry>, key: &str, start: isize, stop: isize) -> Result<()> {
    purge_expired(entries, key);
    let Some(entry) = entries.get_mut(key) else {
        return Ok(());
    };
    let list = match &mut entry.value {
        StoredValue::List(list) => list,
        other => return Err(wrong_type(key, other)),
    };

    match resolve_range(list.len(), start, stop) {
        Some((from, to)) => {
            list.truncate(to + 1);
            list.drain(..from);
        }
        None => list.clear(),
    }

    // Redis deletes a list once it becomes empty
    if list.is_empty() {
        entries.remove(key);
    }
    Ok(())
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        match entries.get(key) {
            Some(StoreEntry {
                value: StoredValue::Text(text),
                ..
            }) => Ok(Some(text.clone())),
            Some(other) => Err(wrong_type(key, &other.value)),
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        // Same floor as the Redis backend, which only speaks whole seconds
        let ttl = if ttl.is_zero() { MIN_TTL } else { ttl };
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            StoreEntry::text(value, ttl.as_millis() as u64),
        );
        Ok(())
    }

    async fn lpush(&self, key: &str, value: &str) -> Result<usize> {
        let mut entries = self.entries.write().await;
        push_head(&mut entries, key, value)
    }

    async fn ltrim(&self, key: &str, start: isize, stop: isize) -> Result<()> {
        let mut entries = self.entries.write().await;
        trim(&mut entries, key, start, stop)
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut entries = self.entries.write().await;
        purge_expired(&mut entries, key);
        let list = match entries.get(key) {
            Some(StoreEntry {
                value: StoredValue::List(list),
                ..
            }) => list,
            Some(other) => return Err(wrong_type(key, &other.value)),
            None => return Ok(Vec::new()),
        };

        Ok(match resolve_range(list.len(), start, stop) {
            Some((from, to)) => list.range(from..=to).cloned().collect(),
            None => Vec::new(),
        })
    }

    /// Push and trim under one lock, so the cap holds even with concurrent writers.
    async fn push_capped(&self, key: &str, value: &str, max: usize) -> Result<usize> {
        let mut entries = self.entries.write().await;
        let len = push_head(&mut entries, key, value)?;
        trim(&mut entries, key, 0, max as isize - 1)?;
        Ok(len.min(max))
    }

    async fn ping(&self) -> Result<String> {
        Ok("PONG".to_string())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
