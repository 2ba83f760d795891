/// Mock implementations for testing
mod mock_package_registry;
mod mock_progress_reporter;

pub use mock_package_registry::MockPackageRegistry;
pub use mock_progress_reporter::MockProgressReporter;
