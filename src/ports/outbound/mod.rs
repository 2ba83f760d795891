/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the application core uses
/// to interact with external systems (registry, cache, console, etc.).
pub mod formatter;
pub mod metadata_cache;
pub mod output_presenter;
pub mod package_registry;
pub mod progress_reporter;

pub use formatter::ReportFormatter;
pub use metadata_cache::MetadataCache;
pub use output_presenter::OutputPresenter;
pub use package_registry::{DependencyGroup, DependencySpec, PackageDetails, PackageRegistry};
pub use progress_reporter::{LoadProgressCallback, ProgressReporter};
