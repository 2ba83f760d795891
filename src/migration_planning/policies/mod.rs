mod framework_compatibility;
mod version_selection;

pub use framework_compatibility::FrameworkCompatibilityPolicy;
pub use version_selection::VersionSelectionPolicy;
