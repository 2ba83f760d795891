use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Maximum number of versions kept on a node (newest first)
pub const MAX_AVAILABLE_VERSIONS: usize = 10;

/// Placeholder version used when the registry knows no versions for a package
pub const UNKNOWN_VERSION: &str = "unknown";

/// Migration status of a package relative to the analysed frameworks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum MigrationStatus {
    /// Supports every framework and no direct dependency is blocked.
    /// Also the initial value of freshly loaded nodes, before analysis.
    #[default]
    Ready,
    /// Supports every framework but at least one direct dependency is blocked
    Partial,
    /// Cannot be migrated as-is
    Blocked,
    /// Needs a different version per framework
    Split,
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationStatus::Ready => write!(f, "ready"),
            MigrationStatus::Partial => write!(f, "partial"),
            MigrationStatus::Blocked => write!(f, "blocked"),
            MigrationStatus::Split => write!(f, "split"),
        }
    }
}

/// How a package satisfies a target framework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatibilityMode {
    Direct,
    Netstandard,
    Portable,
    None,
}

/// Compatibility of one package against one framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkCompatibility {
    pub framework: String,
    pub supported: bool,
    pub compatibility_mode: CompatibilityMode,
    /// Declared framework that produced the match, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched_framework: Option<String>,
}

/// Version to use for one framework of a split package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameworkVersionPin {
    pub framework: String,
    pub version: String,
}

/// One occurrence of a package in the resolved dependency tree.
///
/// Each package id is fully expanded exactly once; every other occurrence is
/// either a shared reference (a value copy of the resolved node without
/// children) or a cyclic terminal node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageNode {
    pub id: String,
    pub version: String,
    /// Version requested on the incoming edge; `None` for roots
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_version: Option<String>,
    pub available_versions: Vec<String>,
    pub is_internal: bool,
    pub depth: usize,
    pub target_frameworks: Vec<String>,
    pub dependencies: Vec<PackageNode>,
    pub status: MigrationStatus,
    pub blocker_count: usize,
    pub migration_order: i64,
    pub is_cyclic: bool,
    pub is_shared_reference: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_compatibility: Option<Vec<FrameworkCompatibility>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_framework_versions: Option<Vec<FrameworkVersionPin>>,
}

impl PackageNode {
    /// Creates a fully loaded node
    #[allow(clippy::too_many_arguments)]
    pub fn resolved(
        id: String,
        version: String,
        requested_version: Option<String>,
        available_versions: Vec<String>,
        is_internal: bool,
        depth: usize,
        target_frameworks: Vec<String>,
        dependencies: Vec<PackageNode>,
    ) -> Self {
        let mut available_versions = available_versions;
        available_versions.truncate(MAX_AVAILABLE_VERSIONS);

        Self {
            id,
            version,
            requested_version,
            available_versions,
            is_internal,
            depth,
            target_frameworks: dedup_frameworks(target_frameworks),
            dependencies,
            status: MigrationStatus::Ready,
            blocker_count: 0,
            migration_order: -1,
            is_cyclic: false,
            is_shared_reference: false,
            framework_compatibility: None,
            per_framework_versions: None,
        }
    }

    /// Creates the terminal node that closes a cycle back to an ancestor
    pub fn cyclic(id: String, requested_version: Option<String>, is_internal: bool, depth: usize) -> Self {
        let version = requested_version
            .clone()
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        Self {
            status: MigrationStatus::Blocked,
            is_cyclic: true,
            ..Self::resolved(
                id,
                version,
                requested_version,
                vec![],
                is_internal,
                depth,
                vec![],
                vec![],
            )
        }
    }

    /// Returns a childless copy of this node marking a repeated occurrence
    pub fn shared_reference(&self, depth: usize, requested_version: Option<String>) -> Self {
        Self {
            id: self.id.clone(),
            version: self.version.clone(),
            requested_version,
            available_versions: self.available_versions.clone(),
            is_internal: self.is_internal,
            depth,
            target_frameworks: self.target_frameworks.clone(),
            dependencies: vec![],
            status: self.status,
            blocker_count: self.blocker_count,
            migration_order: self.migration_order,
            is_cyclic: false,
            is_shared_reference: true,
            framework_compatibility: self.framework_compatibility.clone(),
            per_framework_versions: self.per_framework_versions.clone(),
        }
    }

    /// Case-insensitive identity key
    pub fn key(&self) -> String {
        package_key(&self.id)
    }

    /// True for the single occurrence that owns the expanded subtree
    pub fn is_expanded(&self) -> bool {
        !self.is_cyclic && !self.is_shared_reference
    }

    /// Version used when this occurrence is counted as a dependency edge
    pub fn edge_version(&self) -> &str {
        self.requested_version.as_deref().unwrap_or(&self.version)
    }

    /// Visits this node and every descendant occurrence in pre-order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a PackageNode)) {
        visit(self);
        for child in &self.dependencies {
            child.walk(visit);
        }
    }
}

/// Normalised identity key for a package id (package ids are case-insensitive)
pub fn package_key(id: &str) -> String {
    id.trim().to_lowercase()
}

fn dedup_frameworks(frameworks: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    frameworks
        .into_iter()
        .filter(|tfm| seen.insert(tfm.to_lowercase()))
        .collect()
}
