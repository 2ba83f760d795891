use crate::ports::outbound::OutputPresenter;
use crate::shared::error::MigrationError;
use crate::shared::security::validate_writable_target;
use crate::shared::Result;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// FileSystemWriter adapter for writing the roadmap report to a file
///
/// This adapter implements the OutputPresenter port for file output.
pub struct FileSystemWriter {
    output_path: PathBuf,
}

impl FileSystemWriter {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }

    /// Validates that the parent directory exists before writing
    fn validate_parent_directory(&self) -> Result<()> {
        if let Some(parent) = self.output_path.parent() {
            if parent != Path::new("") && !parent.is_dir() {
                return Err(MigrationError::FileWriteError {
                    path: self.output_path.clone(),
                    details: format!("Parent directory does not exist: {}", parent.display()),
                }
                .into());
            }
        }
        Ok(())
    }
}

impl OutputPresenter for FileSystemWriter {
    fn present(&self, content: &str) -> Result<()> {
        self.validate_parent_directory()?;
        validate_writable_target(&self.output_path)?;

        fs::write(&self.output_path, content).map_err(|e| MigrationError::FileWriteError {
            path: self.output_path.clone(),
            details: e.to_string(),
        })?;

        eprintln!("✅ Roadmap written to: {}", self.output_path.display());
        Ok(())
    }
}

/// StdoutPresenter adapter for writing the report to stdout
pub struct StdoutPresenter;

impl StdoutPresenter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StdoutPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputPresenter for StdoutPresenter {
    fn present(&self, content: &str) -> Result<()> {
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(content.as_bytes())
            .and_then(|_| {
                if content.ends_with('\n') {
                    Ok(())
                } else {
                    stdout.write_all(b"\n")
                }
            })
            .map_err(|e| anyhow::anyhow!("Failed to write to stdout: {}", e))?;
        Ok(())
    }
}
