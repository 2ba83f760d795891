use async_trait::async_trait;
use nuget_roadmap::ports::outbound::{
    DependencyGroup, DependencySpec, PackageDetails, PackageRegistry,
};
use nuget_roadmap::shared::error::RegistryError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Mock PackageRegistry for testing
///
/// Packages are registered with their versions (newest first) and, per
/// version, the declared frameworks and dependencies. Every call is counted.
#[derive(Default)]
pub struct MockPackageRegistry {
    versions: HashMap<String, Vec<String>>,
    details: HashMap<String, PackageDetails>,
    failing: HashSet<String>,
    search_fails: bool,
    pub version_calls: Mutex<Vec<String>>,
    pub details_calls: Mutex<Vec<String>>,
    pub search_calls: Mutex<usize>,
}

#[allow(dead_code)]
impl MockPackageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a package; every version declares the same frameworks and dependencies
    pub fn with_package(
        mut self,
        id: &str,
        versions: &[&str],
        frameworks: &[&str],
        dependencies: &[(&str, &str)],
    ) -> Self {
        self.versions.insert(
            id.to_lowercase(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        for version in versions {
            self.details
                .insert(details_key(id, version), details(frameworks, dependencies));
        }
        self
    }

    /// Overrides what one version declares
    pub fn with_version(
        mut self,
        id: &str,
        version: &str,
        frameworks: &[&str],
        dependencies: &[(&str, &str)],
    ) -> Self {
        self.details
            .insert(details_key(id, version), details(frameworks, dependencies));
        self
    }

    /// Makes every request for `id` fail with a network error
    pub fn with_failure(mut self, id: &str) -> Self {
        self.failing.insert(id.to_lowercase());
        self
    }

    /// Makes prefix searches fail with a network error
    pub fn with_search_failure(mut self) -> Self {
        self.search_fails = true;
        self
    }

    pub fn total_calls(&self) -> usize {
        self.version_calls.lock().unwrap().len() + self.details_calls.lock().unwrap().len()
    }

    pub fn details_calls_for(&self, id: &str) -> usize {
        self.details_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.eq_ignore_ascii_case(id))
            .count()
    }
}

fn details_key(id: &str, version: &str) -> String {
    format!("{}@{}", id.to_lowercase(), version.to_lowercase())
}

fn details(frameworks: &[&str], dependencies: &[(&str, &str)]) -> PackageDetails {
    let specs: Vec<DependencySpec> = dependencies
        .iter()
        .map(|(id, range)| DependencySpec::new(id, Some(*range)))
        .collect();
    let groups = if frameworks.is_empty() {
        vec![DependencyGroup {
            target_framework: None,
            dependencies: specs,
        }]
    } else {
        frameworks
            .iter()
            .map(|framework| DependencyGroup {
                target_framework: Some(framework.to_string()),
                dependencies: specs.clone(),
            })
            .collect()
    };
    PackageDetails {
        description: None,
        dependency_groups: groups,
    }
}

#[async_trait]
impl PackageRegistry for MockPackageRegistry {
    async fn list_versions(&self, package_id: &str) -> Result<Vec<String>, RegistryError> {
        self.version_calls
            .lock()
            .unwrap()
            .push(package_id.to_string());
        if self.failing.contains(&package_id.to_lowercase()) {
            return Err(RegistryError::network(package_id, "connection refused"));
        }
        self.versions
            .get(&package_id.to_lowercase())
            .cloned()
            .ok_or_else(|| RegistryError::not_found(package_id))
    }

    async fn get_details(
        &self,
        package_id: &str,
        version: &str,
    ) -> Result<PackageDetails, RegistryError> {
        self.details_calls
            .lock()
            .unwrap()
            .push(package_id.to_string());
        if self.failing.contains(&package_id.to_lowercase()) {
            return Err(RegistryError::network(package_id, "connection refused"));
        }
        self.details
            .get(&details_key(package_id, version))
            .cloned()
            .ok_or_else(|| RegistryError::not_found(package_id))
    }

    async fn search_by_prefix(&self, prefix: &str) -> Result<Vec<String>, RegistryError> {
        *self.search_calls.lock().unwrap() += 1;
        if self.search_fails {
            return Err(RegistryError::network(prefix, "search service unavailable"));
        }
        let needle = prefix.to_lowercase();
        let mut ids: Vec<String> = self
            .versions
            .keys()
            .filter(|id| id.starts_with(&needle))
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }
}
