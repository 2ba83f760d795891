//! nuget-roadmap - migration roadmap tool for NuGet package families
//!
//! This library resolves the dependency trees of a set of NuGet packages,
//! checks each package against a target framework and plans the order in
//! which the packages can be migrated, following hexagonal architecture and
//! Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`migration_planning`): Tree model, compatibility policies and services
//! - **Application Layer** (`application`): Use cases and DTOs
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use nuget_roadmap::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<()> {
//! // Create adapters
//! let registry = Arc::new(NuGetRegistryClient::new(NuGetEndpoints::default())?);
//! let cache = Arc::new(InMemoryMetadataCache::with_ttl_hours(24));
//! let progress_reporter = Arc::new(StderrProgressReporter::new());
//!
//! // Create use case
//! let use_case = AnalyzeMigrationUseCase::new(registry, cache, progress_reporter);
//!
//! // Execute
//! let request = AnalysisRequest::builder()
//!     .packages(["Contoso.Core"])
//!     .target_framework("net8.0")
//!     .build()?;
//! let response = use_case.execute(request).await?;
//!
//! // Format output
//! let output = TextFormatter::new(false).format(&response)?;
//! println!("{}", output);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod cli;
pub mod config;
pub mod migration_planning;
pub mod ports;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::cache::InMemoryMetadataCache;
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileMetadataCache, FileSystemWriter, StdoutPresenter,
    };
    pub use crate::adapters::outbound::formatters::{JsonFormatter, TextFormatter};
    pub use crate::adapters::outbound::network::{NuGetEndpoints, NuGetRegistryClient};
    pub use crate::application::dto::{
        AnalysisRequest, AnalysisResponse, AnalysisSummary, OutputFormat,
    };
    pub use crate::application::use_cases::AnalyzeMigrationUseCase;
    pub use crate::migration_planning::domain::{
        MigrationStage, MigrationStatus, PackageNode, TargetFramework, VersionConflict,
    };
    pub use crate::migration_planning::policies::{
        FrameworkCompatibilityPolicy, VersionSelectionPolicy,
    };
    pub use crate::migration_planning::services::{
        ConflictDetector, DependencyTreeLoader, InternalMask, MigrationAnalyzer,
        MigrationOrderer, StagePlanner,
    };
    pub use crate::ports::outbound::{
        MetadataCache, OutputPresenter, PackageRegistry, ProgressReporter, ReportFormatter,
    };
    pub use crate::shared::Result;
}
