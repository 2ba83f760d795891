use crate::migration_planning::domain::{
    package_key, PackageNode, VersionConflict, VersionRequest, UNKNOWN_VERSION,
};
use std::collections::HashMap;

/// ConflictDetector finds diamond dependencies requested at different versions.
///
/// Every (parent, child) edge of the tree is recorded with the version the
/// parent asks for. Shared-reference children count as edges too, because
/// they keep the version requested on their own incoming edge.
pub struct ConflictDetector;

impl ConflictDetector {
    /// Returns one conflict per package requested at two or more distinct
    /// versions, in the order packages were first requested
    pub fn detect(roots: &[PackageNode]) -> Vec<VersionConflict> {
        let mut position: HashMap<String, usize> = HashMap::new();
        let mut collected: Vec<VersionConflict> = Vec::new();

        for root in roots {
            root.walk(&mut |parent| {
                for child in &parent.dependencies {
                    let version = child.edge_version();
                    if version == UNKNOWN_VERSION {
                        continue;
                    }
                    let slot = *position.entry(package_key(&child.id)).or_insert_with(|| {
                        collected.push(VersionConflict {
                            package_id: child.id.clone(),
                            requests: Vec::new(),
                        });
                        collected.len() - 1
                    });
                    collected[slot].requests.push(VersionRequest {
                        requested_by: parent.id.clone(),
                        version: version.to_string(),
                    });
                }
            });
        }

        collected
            .into_iter()
            .filter(|candidate| candidate.distinct_versions().len() >= 2)
            .collect()
    }
}
