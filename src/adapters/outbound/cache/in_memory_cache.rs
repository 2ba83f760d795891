use crate::ports::outbound::MetadataCache;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A stored value and the moment it was written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub value: Value,
    pub stored_at: DateTime<Utc>,
}

/// InMemoryMetadataCache adapter - concurrent key/value store with a TTL
///
/// Entries older than the TTL read as absent and are evicted on access.
/// Safe to share between the concurrent branches of a tree load.
pub struct InMemoryMetadataCache {
    entries: DashMap<String, CacheEntry>,
    ttl: TimeDelta,
}

impl InMemoryMetadataCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Creates a cache whose entries live for `hours`
    pub fn with_ttl_hours(hours: u64) -> Self {
        Self::new(Duration::from_secs(hours.saturating_mul(3600)))
    }

    /// Number of stored entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Live entries sorted by key
    pub fn snapshot(&self) -> Vec<(String, CacheEntry)> {
        let now = Utc::now();
        let mut live: Vec<(String, CacheEntry)> = self
            .entries
            .iter()
            .filter(|entry| !self.is_expired(entry.value(), now))
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        live.sort_by(|a, b| a.0.cmp(&b.0));
        live
    }

    /// Re-inserts a previously stored entry, keeping its timestamp.
    /// Returns false (and stores nothing) when the entry has already expired.
    pub fn restore(&self, key: &str, entry: CacheEntry) -> bool {
        if self.is_expired(&entry, Utc::now()) {
            return false;
        }
        self.entries.insert(key.to_string(), entry);
        true
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(entry.stored_at) > self.ttl
    }
}

impl MetadataCache for InMemoryMetadataCache {
    fn get(&self, key: &str) -> Option<Value> {
        let now = Utc::now();
        let value = {
            let entry = self.entries.get(key)?;
            if self.is_expired(entry.value(), now) {
                None
            } else {
                Some(entry.value().value.clone())
            }
        };
        if value.is_none() {
            self.entries.remove(key);
        }
        value
    }

    fn set(&self, key: &str, value: Value) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Utc::now(),
            },
        );
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&self) {
        self.entries.clear();
    }
}
