use super::package_index::PackageIndex;
use crate::migration_planning::domain::{package_key, MigrationOrder, PackageNode};
use std::collections::HashMap;

/// MigrationOrderer computes the linear migration order of a tree.
///
/// Packages are ranked by their position in a depth-first post-order walk,
/// so every package comes after the packages it depends on. Cycles are
/// broken by skipping the edge back into the walk stack; the skipped edges
/// are reported in `MigrationOrder::broken_edges`.
pub struct MigrationOrderer;

impl MigrationOrderer {
    /// Computes the order of all unique packages reachable from `roots`
    pub fn compute(roots: &[PackageNode]) -> MigrationOrder {
        let walk = PackageIndex::build(roots).post_order();
        MigrationOrder {
            package_ids: walk.nodes.iter().map(|node| node.id.clone()).collect(),
            broken_edges: walk.broken_edges,
        }
    }

    /// Returns the tree with `migration_order` set on every occurrence
    pub fn assign(roots: Vec<PackageNode>, order: &MigrationOrder) -> Vec<PackageNode> {
        let ranks: HashMap<String, i64> = order
            .package_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (package_key(id), index as i64 + 1))
            .collect();
        roots
            .into_iter()
            .map(|root| with_rank(root, &ranks))
            .collect()
    }
}

fn with_rank(mut node: PackageNode, ranks: &HashMap<String, i64>) -> PackageNode {
    node.migration_order = ranks.get(&node.key()).copied().unwrap_or(-1);
    node.dependencies = node
        .dependencies
        .into_iter()
        .map(|child| with_rank(child, ranks))
        .collect();
    node
}
