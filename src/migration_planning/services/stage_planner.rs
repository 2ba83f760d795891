use super::package_index::PackageIndex;
use crate::migration_planning::domain::{MigrationStage, MigrationStatus, PackageNode};
use std::collections::{HashMap, HashSet};

/// StagePlanner groups root packages into migration stages.
///
/// A root is placed strictly after every other root it depends on, directly
/// or transitively. Roots whose prerequisites are all placed form the next
/// stage. When no remaining root qualifies, the roots depend on each other
/// circularly and all of them are placed in one final stage.
pub struct StagePlanner;

impl StagePlanner {
    /// Plans stages for the given roots (duplicates are staged once)
    pub fn plan(roots: &[PackageNode]) -> Vec<MigrationStage> {
        let index = PackageIndex::build(roots);

        let mut seen = HashSet::new();
        let root_keys: Vec<String> = roots
            .iter()
            .map(PackageNode::key)
            .filter(|key| seen.insert(key.clone()))
            .collect();
        let root_set: HashSet<&str> = root_keys.iter().map(String::as_str).collect();

        let prerequisites: HashMap<&str, HashSet<String>> = root_keys
            .iter()
            .map(|key| (key.as_str(), reachable_roots(&index, key, &root_set)))
            .collect();

        let mut stages = Vec::new();
        let mut placed: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<&str> = root_keys.iter().map(String::as_str).collect();

        while !remaining.is_empty() {
            let (mut ready, blocked): (Vec<&str>, Vec<&str>) =
                remaining.iter().partition(|key| {
                    prerequisites[**key]
                        .iter()
                        .all(|prerequisite| placed.contains(prerequisite.as_str()))
                });

            let circular = ready.is_empty();
            if circular {
                ready = blocked.clone();
            }
            ready.sort_by_key(|key| stage_sort_key(&index, key));

            stages.push(MigrationStage {
                number: stages.len() + 1,
                package_ids: ready
                    .iter()
                    .filter_map(|key| index.get(key).map(|node| node.id.clone()))
                    .collect(),
                circular,
            });

            if circular {
                break;
            }
            placed.extend(ready.iter().copied());
            remaining = blocked;
        }

        stages
    }
}

/// Other roots reachable from `start`, following shared references to the
/// expanded node and visiting each package once
fn reachable_roots(index: &PackageIndex<'_>, start: &str, roots: &HashSet<&str>) -> HashSet<String> {
    let mut found = HashSet::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut stack = vec![start.to_string()];

    while let Some(key) = stack.pop() {
        if !visited.insert(key.clone()) {
            continue;
        }
        let Some(node) = index.get(&key) else {
            continue;
        };
        for child in &node.dependencies {
            let child_key = child.key();
            if child_key != start && roots.contains(child_key.as_str()) {
                found.insert(child_key.clone());
            }
            stack.push(child_key);
        }
    }

    found
}

/// Simpler packages first: non-split before split, then fewer direct dependencies
fn stage_sort_key(index: &PackageIndex<'_>, key: &str) -> (bool, usize) {
    index
        .get(key)
        .map(|node| (node.status == MigrationStatus::Split, node.dependencies.len()))
        .unwrap_or((false, 0))
}
