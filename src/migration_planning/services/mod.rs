pub mod cached_metadata;
mod conflict_detector;
mod internal_mask;
mod migration_analyzer;
mod migration_order;
mod package_index;
mod stage_planner;
mod tree_loader;

#[cfg(test)]
pub(crate) mod test_support;

pub use cached_metadata::{CachedDependency, CachedFrameworks, CachedPackage};
pub use conflict_detector::ConflictDetector;
pub use internal_mask::InternalMask;
pub use migration_analyzer::{AnalysisTargets, MigrationAnalyzer};
pub use migration_order::MigrationOrderer;
pub use package_index::PackageIndex;
pub use stage_planner::StagePlanner;
pub use tree_loader::{DependencyTreeLoader, LoaderOptions, DEFAULT_CONCURRENCY};
