use crate::migration_planning::domain::{normalize_moniker, package_key};
use crate::shared::error::RegistryError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A declared dependency inside one framework group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencySpec {
    pub id: String,
    #[serde(default)]
    pub range: Option<String>,
}

impl DependencySpec {
    pub fn new(id: &str, range: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            range: range.map(str::to_string),
        }
    }
}

/// Dependencies declared for one target framework (or for all, when `None`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyGroup {
    #[serde(default)]
    pub target_framework: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
}

/// Metadata of one package version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageDetails {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dependency_groups: Vec<DependencyGroup>,
}

impl PackageDetails {
    /// Declared frameworks, normalised to short monikers, in declaration order
    pub fn target_frameworks(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.dependency_groups
            .iter()
            .filter_map(|group| group.target_framework.as_deref())
            .filter_map(normalize_moniker)
            .filter(|moniker| seen.insert(moniker.clone()))
            .collect()
    }

    /// Dependencies of every framework group flattened into one list.
    ///
    /// Deduplicated by package id (case-insensitive); the first occurrence wins.
    pub fn merged_dependencies(&self) -> Vec<DependencySpec> {
        let mut seen = HashSet::new();
        self.dependency_groups
            .iter()
            .flat_map(|group| group.dependencies.iter())
            .filter(|dep| seen.insert(package_key(&dep.id)))
            .cloned()
            .collect()
    }
}

/// PackageRegistry port for querying a remote package feed
///
/// # Async Support
/// All methods are async so the tree loader can keep several requests in
/// flight. Implementations must be `Send + Sync` to support concurrent access.
#[async_trait]
pub trait PackageRegistry: Send + Sync {
    /// Lists the known versions of a package, newest first
    ///
    /// # Errors
    /// `RegistryError::NotFound` when the package does not exist,
    /// `RegistryError::Network` on transport failures
    async fn list_versions(&self, package_id: &str) -> Result<Vec<String>, RegistryError>;

    /// Fetches the metadata of one package version
    async fn get_details(
        &self,
        package_id: &str,
        version: &str,
    ) -> Result<PackageDetails, RegistryError>;

    /// Lists package ids starting with `prefix`, flattened over all result
    /// pages and deduplicated
    async fn search_by_prefix(&self, prefix: &str) -> Result<Vec<String>, RegistryError>;
}
