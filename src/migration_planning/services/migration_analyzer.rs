use super::cached_metadata::{self, CachedFrameworks};
use super::package_index::PackageIndex;
use crate::migration_planning::domain::{
    FrameworkCompatibility, FrameworkVersionPin, MigrationStatus, PackageNode,
};
use crate::migration_planning::policies::FrameworkCompatibilityPolicy;
use crate::ports::outbound::{MetadataCache, PackageRegistry};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;

/// Frameworks a tree is analysed against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisTargets {
    /// Target first, then the current frameworks; lowercased, no duplicates
    frameworks: Vec<String>,
}

impl AnalysisTargets {
    /// Targets for migrating to `target` while still serving `current`
    pub fn new(target: &str, current: &[String]) -> Self {
        let mut seen = HashSet::new();
        let frameworks = std::iter::once(target)
            .chain(current.iter().map(String::as_str))
            .map(|tfm| tfm.trim().to_lowercase())
            .filter(|tfm| !tfm.is_empty() && seen.insert(tfm.clone()))
            .collect();
        Self { frameworks }
    }

    pub fn single(target: &str) -> Self {
        Self::new(target, &[])
    }

    pub fn target(&self) -> &str {
        self.frameworks.first().map(String::as_str).unwrap_or_default()
    }

    /// Every framework in scope, target first
    pub fn frameworks(&self) -> &[String] {
        &self.frameworks
    }

    /// True when more than one framework is in scope, enabling split resolution
    pub fn is_multi_framework(&self) -> bool {
        self.frameworks.len() > 1
    }
}

/// Analysis result of one unique package
#[derive(Debug, Clone)]
struct Verdict {
    status: MigrationStatus,
    blocker_count: usize,
    framework_compatibility: Vec<FrameworkCompatibility>,
    per_framework_versions: Option<Vec<FrameworkVersionPin>>,
}

/// MigrationAnalyzer annotates a loaded tree with migration statuses.
///
/// Packages are classified bottom-up, each unique package once, and the
/// verdict is copied onto every occurrence of it:
/// - `ready`: every framework supported and no direct dependency blocked
/// - `partial`: every framework supported, some direct dependency blocked
/// - `blocked`: no framework supported, a cyclic occurrence, or a failed split
/// - `split`: with several frameworks in scope, each unsupported framework
///   can be served by another available version of the package
///
/// Split resolution reads candidate frameworks from the cache first and only
/// asks the registry on a miss (never in cache-only mode).
pub struct MigrationAnalyzer<R, C> {
    registry: Arc<R>,
    cache: Arc<C>,
    cache_only: bool,
}

impl<R, C> MigrationAnalyzer<R, C>
where
    R: PackageRegistry,
    C: MetadataCache,
{
    pub fn new(registry: Arc<R>, cache: Arc<C>, cache_only: bool) -> Self {
        Self {
            registry,
            cache,
            cache_only,
        }
    }

    /// Returns the annotated tree
    pub async fn analyze(
        &self,
        roots: Vec<PackageNode>,
        targets: &AnalysisTargets,
    ) -> Vec<PackageNode> {
        let verdicts = self.classify_all(&roots, targets).await;
        roots
            .into_iter()
            .map(|root| annotate(root, &verdicts))
            .collect()
    }

    async fn classify_all(
        &self,
        roots: &[PackageNode],
        targets: &AnalysisTargets,
    ) -> HashMap<String, Verdict> {
        let index = PackageIndex::build(roots);
        let mut verdicts = HashMap::with_capacity(index.len());

        for node in index.post_order().nodes {
            let verdict = self.classify(node, &verdicts, targets).await;
            verdicts.insert(node.key(), verdict);
        }
        verdicts
    }

    async fn classify(
        &self,
        node: &PackageNode,
        verdicts: &HashMap<String, Verdict>,
        targets: &AnalysisTargets,
    ) -> Verdict {
        let compatibility =
            FrameworkCompatibilityPolicy::check_all(&node.target_frameworks, targets.frameworks());
        let blocker_count = node
            .dependencies
            .iter()
            .filter(|child| dependency_status(child, verdicts) == MigrationStatus::Blocked)
            .count();

        let supported = compatibility.iter().filter(|c| c.supported).count();
        let mut per_framework_versions = None;

        let status = if supported == compatibility.len() {
            if blocker_count > 0 {
                MigrationStatus::Partial
            } else {
                MigrationStatus::Ready
            }
        } else if supported == 0 || !targets.is_multi_framework() {
            MigrationStatus::Blocked
        } else {
            match self.resolve_split(node, &compatibility).await {
                Some(pins) => {
                    per_framework_versions = Some(pins);
                    MigrationStatus::Split
                }
                None => MigrationStatus::Blocked,
            }
        };

        debug!(package = %node.id, version = %node.version, %status, blocker_count, "Classified");
        Verdict {
            status,
            blocker_count,
            framework_compatibility: compatibility,
            per_framework_versions,
        }
    }

    /// Finds a version for every unsupported framework, keeping the current
    /// version for the supported ones. `None` when any framework stays unserved.
    async fn resolve_split(
        &self,
        node: &PackageNode,
        compatibility: &[FrameworkCompatibility],
    ) -> Option<Vec<FrameworkVersionPin>> {
        let mut pins = Vec::with_capacity(compatibility.len());
        for entry in compatibility {
            let version = if entry.supported {
                node.version.clone()
            } else {
                self.find_version_for(node, &entry.framework).await?
            };
            pins.push(FrameworkVersionPin {
                framework: entry.framework.clone(),
                version,
            });
        }
        Some(pins)
    }

    /// Newest available version (other than the current one) supporting `framework`
    async fn find_version_for(&self, node: &PackageNode, framework: &str) -> Option<String> {
        for candidate in node
            .available_versions
            .iter()
            .filter(|version| **version != node.version)
        {
            let Some(frameworks) = self.frameworks_of(&node.id, candidate).await else {
                continue;
            };
            if FrameworkCompatibilityPolicy::check(&frameworks, framework).supported {
                debug!(package = %node.id, %candidate, framework, "Split candidate found");
                return Some(candidate.clone());
            }
        }
        None
    }

    async fn frameworks_of(&self, package_id: &str, version: &str) -> Option<Vec<String>> {
        let key = cached_metadata::version_cache_key(package_id, version);
        if let Some(cached) =
            cached_metadata::read_entry::<CachedFrameworks, _>(self.cache.as_ref(), &key)
        {
            return Some(cached.target_frameworks);
        }
        if self.cache_only {
            return None;
        }

        match self.registry.get_details(package_id, version).await {
            Ok(details) => {
                let target_frameworks = details.target_frameworks();
                cached_metadata::write_entry(
                    self.cache.as_ref(),
                    &key,
                    &CachedFrameworks {
                        target_frameworks: target_frameworks.clone(),
                    },
                );
                Some(target_frameworks)
            }
            Err(e) => {
                debug!(error = %e, "Split candidate unavailable");
                None
            }
        }
    }
}

fn dependency_status(child: &PackageNode, verdicts: &HashMap<String, Verdict>) -> MigrationStatus {
    if child.is_cyclic {
        return MigrationStatus::Blocked;
    }
    verdicts
        .get(&child.key())
        .map(|verdict| verdict.status)
        .unwrap_or(child.status)
}

fn annotate(mut node: PackageNode, verdicts: &HashMap<String, Verdict>) -> PackageNode {
    if node.is_cyclic {
        node.status = MigrationStatus::Blocked;
    } else if let Some(verdict) = verdicts.get(&node.key()) {
        node.status = verdict.status;
        node.blocker_count = verdict.blocker_count;
        node.framework_compatibility = Some(verdict.framework_compatibility.clone());
        node.per_framework_versions = verdict.per_framework_versions.clone();
    }
    node.dependencies = node
        .dependencies
        .into_iter()
        .map(|child| annotate(child, verdicts))
        .collect();
    node
}
