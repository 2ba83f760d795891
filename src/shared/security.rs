use crate::shared::error::MigrationError;
use crate::shared::Result;
use std::fs;
use std::path::Path;

/// Maximum size of a cache snapshot or config file (50 MB)
pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Security
/// Uses `symlink_metadata()` so the link itself is inspected, not its target.
///
/// # Errors
/// Returns an error if the path doesn't exist, is a symbolic link, or is not a
/// regular file.
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| MigrationError::FileReadError {
        path: path.to_path_buf(),
        details: format!("Failed to read {} metadata: {}", file_description, e),
    })?;

    if metadata.is_symlink() {
        return Err(MigrationError::SecurityError {
            path: path.to_path_buf(),
            reason: format!("{} is a symbolic link", file_description),
            hint: "Point the option at a regular file instead of a link".to_string(),
        }
        .into());
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    validate_file_size(metadata.len(), path, MAX_FILE_SIZE)
}

/// Validates that an existing output path is not a symbolic link.
///
/// A path that does not exist yet is accepted.
pub fn validate_writable_target(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(metadata) if metadata.is_symlink() => Err(MigrationError::SecurityError {
            path: path.to_path_buf(),
            reason: "Output path is a symbolic link".to_string(),
            hint: "Writing through symbolic links is not allowed".to_string(),
        }
        .into()),
        _ => Ok(()),
    }
}

/// Validates file size is within acceptable limits
///
/// # Errors
/// Returns an error if the file size exceeds the maximum
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}
