/// Cache adapters implementing the MetadataCache port
mod in_memory_cache;

pub use in_memory_cache::{CacheEntry, InMemoryMetadataCache};
