use crate::migration_planning::domain::{package_key, MAX_AVAILABLE_VERSIONS, UNKNOWN_VERSION};
use crate::ports::outbound::MetadataCache;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Cached view of a resolved package, keyed by lowercased package id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedPackage {
    pub version: String,
    pub available_versions: Vec<String>,
    pub target_frameworks: Vec<String>,
    pub dependencies: Vec<CachedDependency>,
}

impl CachedPackage {
    /// Metadata for a package the registry could not describe
    pub fn missing(requested_version: Option<String>) -> Self {
        Self {
            version: requested_version
                .clone()
                .unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
            available_versions: requested_version.into_iter().collect(),
            target_frameworks: vec![],
            dependencies: vec![],
        }
    }

    /// Copy trimmed for storage
    pub fn for_storage(&self) -> Self {
        let mut stored = self.clone();
        stored.available_versions.truncate(MAX_AVAILABLE_VERSIONS);
        stored
    }
}

/// A dependency edge as stored in the cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedDependency {
    pub id: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// Frameworks declared by one specific package version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedFrameworks {
    pub target_frameworks: Vec<String>,
}

/// Cache key of a resolved package
pub fn package_cache_key(package_id: &str) -> String {
    package_key(package_id)
}

/// Cache key of the frameworks of one package version
pub fn version_cache_key(package_id: &str, version: &str) -> String {
    format!("{}@{}", package_key(package_id), version.to_lowercase())
}

/// Cache key of a prefix search result
pub fn search_cache_key(prefix: &str) -> String {
    format!("search:{}", prefix.trim().to_lowercase())
}

/// Reads and decodes a cache entry.
///
/// An entry that no longer decodes is evicted and reported as a miss.
pub fn read_entry<T, C>(cache: &C, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    C: MetadataCache + ?Sized,
{
    let raw = cache.get(key)?;
    match serde_json::from_value(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "Evicting malformed cache entry");
            cache.remove(key);
            None
        }
    }
}

/// Encodes and stores a cache entry; encoding failures are logged and skipped
pub fn write_entry<T, C>(cache: &C, key: &str, value: &T)
where
    T: Serialize,
    C: MetadataCache + ?Sized,
{
    match serde_json::to_value(value) {
        Ok(raw) => cache.set(key, raw),
        Err(e) => tracing::warn!(key, error = %e, "Failed to encode cache entry"),
    }
}
