/// Filesystem adapters for file I/O operations
mod file_metadata_cache;
mod file_writer;

pub use file_metadata_cache::FileMetadataCache;
pub use file_writer::{FileSystemWriter, StdoutPresenter};
