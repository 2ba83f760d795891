use serde::Serialize;

/// A (requesting package, requested version) pair on a dependency edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionRequest {
    pub requested_by: String,
    pub version: String,
}

/// A package requested at two or more distinct versions across the tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionConflict {
    pub package_id: String,
    pub requests: Vec<VersionRequest>,
}

impl VersionConflict {
    /// Distinct requested versions, in first-seen order
    pub fn distinct_versions(&self) -> Vec<&str> {
        let mut versions: Vec<&str> = Vec::new();
        for request in &self.requests {
            if !versions.contains(&request.version.as_str()) {
                versions.push(&request.version);
            }
        }
        versions
    }
}

/// A dependency edge skipped while breaking a cycle during ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokenEdge {
    pub from: String,
    pub to: String,
}

/// Linear migration order over the unique packages (dependencies first)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationOrder {
    pub package_ids: Vec<String>,
    pub broken_edges: Vec<BrokenEdge>,
}

impl MigrationOrder {
    /// 1-based rank of a package, or `None` when it is not part of the order
    pub fn rank_of(&self, id: &str) -> Option<usize> {
        self.package_ids
            .iter()
            .position(|candidate| candidate.eq_ignore_ascii_case(id))
            .map(|index| index + 1)
    }
}

/// A batch of root packages that can be migrated together
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationStage {
    /// 1-based stage number
    pub number: usize,
    pub package_ids: Vec<String>,
    /// Set on the fallback stage holding roots that depend on each other circularly
    pub circular: bool,
}
