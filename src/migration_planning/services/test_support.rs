//! In-memory registry and cache doubles shared by the service tests.

use crate::migration_planning::domain::{package_key, PackageNode};
use crate::ports::outbound::{
    DependencyGroup, DependencySpec, MetadataCache, PackageDetails, PackageRegistry,
};
use crate::shared::error::RegistryError;
use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct MapCache {
    entries: DashMap<String, Value>,
}

impl MapCache {
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }
}

impl MetadataCache for MapCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|v| v.clone())
    }

    fn set(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    fn clear(&self) {
        self.entries.clear();
    }
}

/// Registry double keyed by lowercased id, then by version
#[derive(Default)]
pub struct FakeRegistry {
    versions: HashMap<String, Vec<String>>,
    details: HashMap<(String, String), PackageDetails>,
    failing: HashSet<String>,
    delay: Option<Duration>,
    search_down: bool,
    pub version_calls: Mutex<Vec<String>>,
    pub details_calls: Mutex<Vec<String>>,
    active: AtomicUsize,
    pub max_active: AtomicUsize,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a package whose newest version declares `frameworks` and `dependencies`
    /// (`(id, range)` pairs). `versions` is newest first.
    pub fn package(
        mut self,
        id: &str,
        versions: &[&str],
        frameworks: &[&str],
        dependencies: &[(&str, &str)],
    ) -> Self {
        let key = package_key(id);
        self.versions
            .insert(key.clone(), versions.iter().map(|v| v.to_string()).collect());
        for version in versions {
            self.details.insert(
                (key.clone(), version.to_string()),
                details(frameworks, dependencies),
            );
        }
        self
    }

    /// Overrides the frameworks declared by one specific version
    pub fn version_frameworks(mut self, id: &str, version: &str, frameworks: &[&str]) -> Self {
        self.details
            .insert((package_key(id), version.to_string()), details(frameworks, &[]));
        self
    }

    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(package_key(id));
        self
    }

    /// Makes every prefix search fail with a network error
    pub fn search_unavailable(mut self) -> Self {
        self.search_down = true;
        self
    }

    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Some(Duration::from_millis(millis));
        self
    }

    pub fn details_calls_for(&self, id: &str) -> usize {
        let key = package_key(id);
        self.details_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| package_key(call) == key)
            .count()
    }

    pub fn total_calls(&self) -> usize {
        self.version_calls.lock().unwrap().len() + self.details_calls.lock().unwrap().len()
    }

    async fn simulate_latency(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

fn details(frameworks: &[&str], dependencies: &[(&str, &str)]) -> PackageDetails {
    let deps: Vec<DependencySpec> = dependencies
        .iter()
        .map(|(id, range)| DependencySpec::new(id, Some(*range)))
        .collect();
    if frameworks.is_empty() {
        return PackageDetails {
            description: None,
            dependency_groups: vec![DependencyGroup {
                target_framework: None,
                dependencies: deps,
            }],
        };
    }
    PackageDetails {
        description: None,
        dependency_groups: frameworks
            .iter()
            .enumerate()
            .map(|(i, tfm)| DependencyGroup {
                target_framework: Some(tfm.to_string()),
                dependencies: if i == 0 { deps.clone() } else { vec![] },
            })
            .collect(),
    }
}

#[async_trait]
impl PackageRegistry for FakeRegistry {
    async fn list_versions(&self, package_id: &str) -> Result<Vec<String>, RegistryError> {
        self.version_calls
            .lock()
            .unwrap()
            .push(package_id.to_string());
        self.simulate_latency().await;
        let key = package_key(package_id);
        if self.failing.contains(&key) {
            return Err(RegistryError::network(package_id, "connection reset"));
        }
        self.versions
            .get(&key)
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
        self.simulate_latency().await;
        let key = package_key(package_id);
        if self.failing.contains(&key) {
            return Err(RegistryError::network(package_id, "connection reset"));
        }
        self.details
            .get(&(key, version.to_string()))
            .cloned()
            .ok_or_else(|| RegistryError::not_found(package_id))
    }

    async fn search_by_prefix(&self, prefix: &str) -> Result<Vec<String>, RegistryError> {
        if self.search_down {
            return Err(RegistryError::network(prefix, "search service unavailable"));
        }
        let prefix = prefix.to_lowercase();
        let mut ids: Vec<String> = self
            .versions
            .keys()
            .filter(|id| id.starts_with(&prefix))
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }
}

/// Builds a resolved node at version 1.0.0
pub fn node(id: &str, frameworks: &[&str], dependencies: Vec<PackageNode>) -> PackageNode {
    PackageNode::resolved(
        id.to_string(),
        "1.0.0".to_string(),
        None,
        vec!["1.0.0".to_string()],
        false,
        0,
        frameworks.iter().map(|f| f.to_string()).collect(),
        dependencies,
    )
}

/// Builds a shared-reference stub of `of` requested at `version`
pub fn stub(of: &PackageNode, version: &str) -> PackageNode {
    of.shared_reference(of.depth + 1, Some(version.to_string()))
}

/// Sets the requested version of an edge
pub fn requested(mut node: PackageNode, version: &str) -> PackageNode {
    node.requested_version = Some(version.to_string());
    node
}
