use crate::adapters::outbound::cache::{CacheEntry, InMemoryMetadataCache};
use crate::ports::outbound::MetadataCache;
use crate::shared::error::MigrationError;
use crate::shared::security::validate_regular_file;
use crate::shared::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Snapshot format version written to disk
const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheSnapshot {
    version: u32,
    #[serde(default)]
    entries: BTreeMap<String, Value>,
}

/// FileMetadataCache adapter - an in-memory TTL cache persisted as JSON
///
/// The snapshot is loaded once when opened and written back by `persist`.
/// Loading is lenient: a malformed file yields an empty cache and
/// individual malformed or expired entries are dropped.
///
/// # Security
/// - Symbolic links are rejected for both reading and writing
/// - Files larger than `MAX_FILE_SIZE` are not read
/// - Writes go through a temporary sibling file and an atomic rename
pub struct FileMetadataCache {
    path: PathBuf,
    memory: InMemoryMetadataCache,
}

impl FileMetadataCache {
    /// Opens the cache stored at `path`, starting empty if it does not exist
    ///
    /// # Errors
    /// Returns an error if the path exists but is a symlink, a directory,
    /// an oversized file, or cannot be read
    pub fn open(path: impl Into<PathBuf>, ttl: Duration) -> Result<Self> {
        let path = path.into();
        let memory = InMemoryMetadataCache::new(ttl);

        if fs::symlink_metadata(&path).is_ok() {
            validate_regular_file(&path, "cache file")?;
            let content =
                fs::read_to_string(&path).map_err(|e| MigrationError::FileReadError {
                    path: path.clone(),
                    details: e.to_string(),
                })?;
            let loaded = Self::load_entries(&memory, &content);
            tracing::debug!(path = %path.display(), entries = loaded, "Cache loaded");
        }

        Ok(Self { path, memory })
    }

    fn load_entries(memory: &InMemoryMetadataCache, content: &str) -> usize {
        let snapshot: CacheSnapshot = match serde_json::from_str(content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring malformed cache file");
                return 0;
            }
        };
        if snapshot.version != SNAPSHOT_VERSION {
            tracing::warn!(
                version = snapshot.version,
                "Ignoring cache file with unsupported format version"
            );
            return 0;
        }

        snapshot
            .entries
            .into_iter()
            .filter_map(|(key, raw)| match serde_json::from_value::<CacheEntry>(raw) {
                Ok(entry) => Some((key, entry)),
                Err(e) => {
                    tracing::debug!(key = %key, error = %e, "Dropping malformed cache entry");
                    None
                }
            })
            .filter(|(key, entry)| memory.restore(key, entry.clone()))
            .count()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries currently held
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }

    /// Writes all live entries back to disk atomically
    ///
    /// # Errors
    /// Returns an error if the target is a symlink or the file cannot be written
    pub fn persist(&self) -> Result<()> {
        let mut entries = BTreeMap::new();
        for (key, entry) in self.memory.snapshot() {
            entries.insert(key, serde_json::to_value(entry)?);
        }
        let snapshot = CacheSnapshot {
            version: SNAPSHOT_VERSION,
            entries,
        };
        let content = serde_json::to_string_pretty(&snapshot)?;

        crate::shared::security::validate_writable_target(&self.path)?;
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| self.write_error(e))?;

        let mut temp = tempfile::NamedTempFile::new_in(&parent).map_err(|e| self.write_error(e))?;
        temp.write_all(content.as_bytes())
            .map_err(|e| self.write_error(e))?;
        temp.persist(&self.path)
            .map_err(|e| self.write_error(e.error))?;

        tracing::debug!(path = %self.path.display(), entries = snapshot.entries.len(), "Cache saved");
        Ok(())
    }

    fn write_error(&self, error: std::io::Error) -> MigrationError {
        MigrationError::FileWriteError {
            path: self.path.clone(),
            details: error.to_string(),
        }
    }
}

impl MetadataCache for FileMetadataCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.memory.get(key)
    }

    fn set(&self, key: &str, value: Value) {
        self.memory.set(key, value);
    }

    fn remove(&self, key: &str) {
        self.memory.remove(key);
    }

    fn clear(&self) {
        self.memory.clear();
    }
}
