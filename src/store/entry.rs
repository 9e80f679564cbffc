//! Store Entry Module
//!
//! Defines the structure for individual in-memory store entries with TTL support.

use std::collections::VecDeque;

// == Stored Value ==
/// The two value shapes the store understands.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// Plain string written by `SET`
    Text(String),
    /// Ordered list written by `LPUSH`; front is the head
    List(VecDeque<String>),
}

impl StoredValue {
    /// Redis-style type name, used in WRONGTYPE errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            StoredValue::Text(_) => "string",
            StoredValue::List(_) => "list",
        }
    }
}

// == Store Entry ==
/// Represents a single store entry with value and metadata.
#[derive(Debug, Clone)]
pub struct StoreEntry {
    /// The stored value
    pub value: StoredValue,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl StoreEntry {
    // == Constructor ==
    /// Creates a new entry with optional TTL in milliseconds.
    pub fn new(value: StoredValue, ttl_ms: Option<u64>) -> Self {
        Self {
            value,
            expires_at: ttl_ms.map(|ttl| current_timestamp_ms() + ttl),
        }
    }

    /// Creates a string entry expiring after `ttl_ms`.
    pub fn text(value: impl Into<String>, ttl_ms: u64) -> Self {
        Self::new(StoredValue::Text(value.into()), Some(ttl_ms))
    }

    /// Creates an empty list entry with no expiration.
    pub fn list() -> Self {
        Self::new(StoredValue::List(VecDeque::new()), None)
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time reaches its expiration time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(current_timestamp_ms())
    }

    /// Same as [`is_expired`](Self::is_expired) against an explicit clock reading.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        match self.expires_at {
            Some(expires) => now_ms >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, or None if no expiration is set.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        let now = current_timestamp_ms();
        self.expires_at.map(|expires| expires.saturating_sub(now))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_entry_expires() {
        let entry = StoreEntry::text("sig", 60_000);

        assert_eq!(entry.value, StoredValue::Text("sig".to_string()));
        assert!(!entry.is_expired());
        let remaining = entry.ttl_remaining_ms().unwrap();
        assert!(remaining <= 60_000 && remaining >= 59_000);
    }

    #[test]
    fn test_list_entry_never_expires() {
        let entry = StoreEntry::list();

        assert!(entry.expires_at.is_none());
        assert!(entry.ttl_remaining_ms().is_none());
        assert!(!entry.is_expired_at(u64::MAX));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = StoreEntry::text("v", 1_000);
        let expires = entry.expires_at.unwrap();

        assert!(!entry.is_expired_at(expires - 1));
        assert!(entry.is_expired_at(expires), "Entry should be expired at boundary");
    }

    #[test]
    fn test_type_names() {
        assert_eq!(StoreEntry::text("v", 1).value.type_name(), "string");
        assert_eq!(StoreEntry::list().value.type_name(), "list");
    }
}
