use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between a clean roadmap,
/// a roadmap with blocked packages, and outright failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - analysis completed (and no blockers, when `--fail-on-blocked` is set)
    Success = 0,
    /// Blocked packages were found and `--fail-on-blocked` was requested
    BlockersDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (registry unreachable, no packages found, file I/O error, etc.)
    ApplicationError = 3,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::BlockersDetected => write!(f, "Blockers Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
        }
    }
}

/// Failures reported by a package registry.
///
/// The tree loader recovers from every variant locally; only the initial
/// prefix search can turn one of these into a top-level failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Package not found in registry: {package_id}")]
    NotFound { package_id: String },

    #[error("Registry request failed for {package_id}: {details}")]
    Network { package_id: String, details: String },

    #[error("Registry returned an unexpected response for {package_id}: {details}")]
    InvalidResponse { package_id: String, details: String },

    #[error("Refusing to query the registry for '{package_id}': {reason}")]
    InvalidPackageId { package_id: String, reason: String },
}

impl RegistryError {
    pub fn not_found(package_id: &str) -> Self {
        RegistryError::NotFound {
            package_id: package_id.to_string(),
        }
    }

    pub fn network(package_id: &str, details: impl fmt::Display) -> Self {
        RegistryError::Network {
            package_id: package_id.to_string(),
            details: details.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound { .. })
    }
}

/// Application-specific errors for migration analysis.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// keeping the user-facing hint next to each message.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("No packages found for prefix: {prefix}\n\n💡 Hint: Check the prefix spelling or list package ids explicitly")]
    NoPackagesFound { prefix: String },

    #[error("Package registry is unreachable while searching for: {prefix}\nDetails: {details}\n\n💡 Hint: Check your network connection, or rerun with a warm --cache file")]
    RegistryUnreachable { prefix: String, details: String },

    #[error("Invalid target framework moniker: {moniker}\n\n💡 Hint: Use a short moniker such as net8.0, netcoreapp3.1 or netstandard2.0")]
    InvalidTargetFramework { moniker: String },

    #[error("Invalid internal package mask: {mask}\nReason: {reason}\n\n💡 Hint: Use '*' as wildcard, e.g. \"Contoso.*\"")]
    InvalidMask { mask: String, reason: String },

    /// Validation error for builder patterns
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}
