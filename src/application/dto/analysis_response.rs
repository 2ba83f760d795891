use crate::migration_planning::domain::{
    AnalysisMetadata, MigrationOrder, MigrationStage, MigrationStatus, PackageNode,
    VersionConflict,
};
use crate::migration_planning::services::PackageIndex;
use serde::Serialize;

/// Headline numbers of one analysis
///
/// Status and internal counts are over unique packages; `cyclic_references`
/// counts occurrences, since the same package can close several cycles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisSummary {
    pub total_packages: usize,
    pub ready: usize,
    pub partial: usize,
    pub blocked: usize,
    pub split: usize,
    pub internal_packages: usize,
    pub cyclic_references: usize,
    pub conflicts: usize,
}

impl AnalysisSummary {
    pub fn from_tree(roots: &[PackageNode], conflicts: &[VersionConflict]) -> Self {
        let index = PackageIndex::build(roots);
        let mut summary = Self {
            total_packages: index.len(),
            conflicts: conflicts.len(),
            ..Self::default()
        };

        for package in index.packages() {
            match package.status {
                MigrationStatus::Ready => summary.ready += 1,
                MigrationStatus::Partial => summary.partial += 1,
                MigrationStatus::Blocked => summary.blocked += 1,
                MigrationStatus::Split => summary.split += 1,
            }
            if package.is_internal {
                summary.internal_packages += 1;
            }
        }

        for root in roots {
            root.walk(&mut |node| {
                if node.is_cyclic {
                    summary.cyclic_references += 1;
                }
            });
        }

        summary
    }
}

/// AnalysisResponse - everything one analysis produced
///
/// Formatters render this; the JSON formatter serializes it as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResponse {
    pub metadata: AnalysisMetadata,
    pub summary: AnalysisSummary,
    /// Non-fatal conditions the user should know about (stale search results, ...)
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notices: Vec<String>,
    pub stages: Vec<MigrationStage>,
    pub migration_order: MigrationOrder,
    pub conflicts: Vec<VersionConflict>,
    pub roots: Vec<PackageNode>,
}

impl AnalysisResponse {
    pub fn new(
        metadata: AnalysisMetadata,
        roots: Vec<PackageNode>,
        migration_order: MigrationOrder,
        stages: Vec<MigrationStage>,
        conflicts: Vec<VersionConflict>,
        notices: Vec<String>,
    ) -> Self {
        let summary = AnalysisSummary::from_tree(&roots, &conflicts);
        Self {
            metadata,
            summary,
            notices,
            stages,
            migration_order,
            conflicts,
            roots,
        }
    }

    /// Whether any package is blocked; drives `--fail-on-blocked`
    pub fn has_blockers(&self) -> bool {
        self.summary.blocked > 0
    }

    /// Unique blocked packages in discovery order
    pub fn blocked_packages(&self) -> Vec<&PackageNode> {
        PackageIndex::build(&self.roots)
            .packages()
            .filter(|package| package.status == MigrationStatus::Blocked)
            .collect()
    }
}
