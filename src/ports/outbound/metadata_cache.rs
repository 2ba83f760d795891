use serde_json::Value;

/// MetadataCache port - key/value store used to skip redundant registry calls
///
/// Expiry (TTL) is the implementation's responsibility and invisible to
/// callers: an expired entry simply reads as absent. Lookups are synchronous
/// so cache hits never wait on the registry concurrency limit.
///
/// Values are stored as JSON; callers decode them and evict entries that no
/// longer decode.
pub trait MetadataCache: Send + Sync {
    /// Returns the stored value, or `None` when absent or expired
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores a value, replacing any previous one (last writer wins)
    fn set(&self, key: &str, value: Value);

    /// Removes a single entry
    fn remove(&self, key: &str);

    /// Removes every entry
    fn clear(&self);
}
