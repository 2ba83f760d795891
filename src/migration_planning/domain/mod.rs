pub mod analysis_metadata;
pub mod package_node;
pub mod roadmap;
pub mod target_framework;

pub use analysis_metadata::AnalysisMetadata;
pub use package_node::{
    package_key, CompatibilityMode, FrameworkCompatibility, FrameworkVersionPin, MigrationStatus,
    PackageNode, MAX_AVAILABLE_VERSIONS, UNKNOWN_VERSION,
};
pub use roadmap::{BrokenEdge, MigrationOrder, MigrationStage, VersionConflict, VersionRequest};
pub use target_framework::{normalize_moniker, FrameworkFamily, FrameworkVersion, TargetFramework};
