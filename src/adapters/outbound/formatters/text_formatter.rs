use crate::application::dto::AnalysisResponse;
use crate::migration_planning::domain::{MigrationStatus, PackageNode};
use crate::migration_planning::services::PackageIndex;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;
use owo_colors::OwoColorize;
use std::fmt::Write;

/// TextFormatter adapter - a human-readable migration roadmap
///
/// Prints the summary, stages, ordered package list, blocked and split
/// packages, and version conflicts. Colors are only applied when requested,
/// which the CLI does when stdout is a terminal.
pub struct TextFormatter {
    use_color: bool,
}

impl TextFormatter {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    fn heading(&self, title: &str) -> String {
        if self.use_color {
            title.bold().to_string()
        } else {
            title.to_string()
        }
    }

    fn status_label(&self, status: MigrationStatus) -> String {
        let label = format!("[{}]", status);
        if !self.use_color {
            return label;
        }
        match status {
            MigrationStatus::Ready => label.green().to_string(),
            MigrationStatus::Partial => label.yellow().to_string(),
            MigrationStatus::Split => label.cyan().to_string(),
            MigrationStatus::Blocked => label.red().to_string(),
        }
    }

    fn write_header(&self, out: &mut String, response: &AnalysisResponse) -> std::fmt::Result {
        let metadata = &response.metadata;
        write!(
            out,
            "{} {}",
            self.heading("Migration roadmap for"),
            metadata.target_framework()
        )?;
        if !metadata.current_frameworks().is_empty() {
            write!(out, " (keeping {})", metadata.current_frameworks().join(", "))?;
        }
        writeln!(out)?;
        writeln!(
            out,
            "Generated by {} {} at {}",
            metadata.tool_name(),
            metadata.tool_version(),
            metadata.timestamp()
        )?;
        writeln!(out)
    }

    fn write_summary(&self, out: &mut String, response: &AnalysisResponse) -> std::fmt::Result {
        let summary = &response.summary;
        writeln!(out, "{}", self.heading("Summary"))?;
        writeln!(
            out,
            "  Packages:  {} ({} internal)",
            summary.total_packages, summary.internal_packages
        )?;
        writeln!(out, "  Ready:     {}", summary.ready)?;
        writeln!(out, "  Partial:   {}", summary.partial)?;
        writeln!(out, "  Split:     {}", summary.split)?;
        writeln!(out, "  Blocked:   {}", summary.blocked)?;
        writeln!(out, "  Conflicts: {}", summary.conflicts)?;
        writeln!(out, "  Cycles:    {}", summary.cyclic_references)?;

        if !response.notices.is_empty() {
            writeln!(out)?;
            writeln!(out, "{}", self.heading("Notices"))?;
            for notice in &response.notices {
                writeln!(out, "  - {}", notice)?;
            }
        }
        writeln!(out)
    }

    fn write_stages(&self, out: &mut String, response: &AnalysisResponse) -> std::fmt::Result {
        writeln!(out, "{}", self.heading("Stages"))?;
        if response.stages.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for stage in &response.stages {
            let marker = if stage.circular { " (circular)" } else { "" };
            writeln!(
                out,
                "  Stage {}{}: {}",
                stage.number,
                marker,
                stage.package_ids.join(", ")
            )?;
        }
        writeln!(out)
    }

    fn write_order(
        &self,
        out: &mut String,
        response: &AnalysisResponse,
        index: &PackageIndex<'_>,
    ) -> std::fmt::Result {
        writeln!(out, "{}", self.heading("Migration order"))?;
        for (position, id) in response.migration_order.package_ids.iter().enumerate() {
            match index.get(id) {
                Some(package) => writeln!(
                    out,
                    "  {:>3}. {} {} {}{}",
                    position + 1,
                    package.id,
                    package.version,
                    self.status_label(package.status),
                    if package.is_internal { " (internal)" } else { "" }
                )?,
                None => writeln!(out, "  {:>3}. {}", position + 1, id)?,
            }
        }
        if !response.migration_order.broken_edges.is_empty() {
            let edges: Vec<String> = response
                .migration_order
                .broken_edges
                .iter()
                .map(|edge| format!("{} -> {}", edge.from, edge.to))
                .collect();
            writeln!(out, "  Cycles broken at: {}", edges.join(", "))?;
        }
        writeln!(out)
    }

    fn write_blocked(&self, out: &mut String, blocked: &[&PackageNode]) -> std::fmt::Result {
        if blocked.is_empty() {
            return Ok(());
        }
        writeln!(out, "{}", self.heading("Blocked packages"))?;
        for package in blocked {
            let declared = if package.target_frameworks.is_empty() {
                "no frameworks".to_string()
            } else {
                package.target_frameworks.join(", ")
            };
            let reason = if package.is_cyclic {
                "circular reference".to_string()
            } else {
                format!("declares {}", declared)
            };
            writeln!(out, "  - {} {}: {}", package.id, package.version, reason)?;
        }
        writeln!(out)
    }

    fn write_split(&self, out: &mut String, index: &PackageIndex<'_>) -> std::fmt::Result {
        let split: Vec<&PackageNode> = index
            .packages()
            .filter(|package| package.status == MigrationStatus::Split)
            .collect();
        if split.is_empty() {
            return Ok(());
        }
        writeln!(out, "{}", self.heading("Split packages"))?;
        for package in split {
            let pins: Vec<String> = package
                .per_framework_versions
                .iter()
                .flatten()
                .map(|pin| format!("{} -> {}", pin.framework, pin.version))
                .collect();
            writeln!(out, "  - {}: {}", package.id, pins.join(", "))?;
        }
        writeln!(out)
    }

    fn write_conflicts(&self, out: &mut String, response: &AnalysisResponse) -> std::fmt::Result {
        if response.conflicts.is_empty() {
            return Ok(());
        }
        writeln!(out, "{}", self.heading("Version conflicts"))?;
        for conflict in &response.conflicts {
            let requests: Vec<String> = conflict
                .requests
                .iter()
                .map(|request| format!("{} by {}", request.version, request.requested_by))
                .collect();
            writeln!(out, "  - {}: {}", conflict.package_id, requests.join(", "))?;
        }
        writeln!(out)
    }
}

impl ReportFormatter for TextFormatter {
    fn format(&self, response: &AnalysisResponse) -> Result<String> {
        let index = PackageIndex::build(&response.roots);
        let blocked = response.blocked_packages();
        let mut out = String::new();

        self.write_header(&mut out, response)?;
        self.write_summary(&mut out, response)?;
        self.write_stages(&mut out, response)?;
        self.write_order(&mut out, response, &index)?;
        self.write_blocked(&mut out, &blocked)?;
        self.write_split(&mut out, &index)?;
        self.write_conflicts(&mut out, response)?;

        Ok(out.trim_end().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration_planning::domain::{
        AnalysisMetadata, BrokenEdge, FrameworkVersionPin, MigrationOrder, MigrationStage,
        VersionConflict, VersionRequest,
    };

    fn package(id: &str, status: MigrationStatus, frameworks: &[&str]) -> PackageNode {
        let mut node = PackageNode::resolved(
            id.to_string(),
            "1.0.0".to_string(),
            None,
            vec!["1.0.0".to_string()],
            id.starts_with("Contoso"),
            1,
            frameworks.iter().map(|f| f.to_string()).collect(),
            vec![],
        );
        node.status = status;
        node
    }

    fn response(notices: Vec<String>) -> AnalysisResponse {
        let blocked = package("Legacy", MigrationStatus::Blocked, &["net472"]);
        let mut split = package("Dual", MigrationStatus::Split, &["net8.0"]);
        split.per_framework_versions = Some(vec![
            FrameworkVersionPin {
                framework: "net8.0".to_string(),
                version: "2.0.0".to_string(),
            },
            FrameworkVersionPin {
                framework: "net6.0".to_string(),
                version: "1.0.0".to_string(),
            },
        ]);
        let mut app = package("Contoso.App", MigrationStatus::Partial, &["net8.0"]);
        app.dependencies = vec![blocked, split];

        AnalysisResponse::new(
            AnalysisMetadata::for_run("net8.0", &["net6.0".to_string()]),
            vec![app],
            MigrationOrder {
                package_ids: vec![
                    "Legacy".to_string(),
                    "Dual".to_string(),
                    "Contoso.App".to_string(),
                ],
                broken_edges: vec![BrokenEdge {
                    from: "Dual".to_string(),
                    to: "Contoso.App".to_string(),
                }],
            },
            vec![MigrationStage {
                number: 1,
                package_ids: vec!["Contoso.App".to_string()],
                circular: false,
            }],
            vec![VersionConflict {
                package_id: "legacy".to_string(),
                requests: vec![
                    VersionRequest {
                        requested_by: "Contoso.App".to_string(),
                        version: "1.0.0".to_string(),
                    },
                    VersionRequest {
                        requested_by: "Dual".to_string(),
                        version: "2.0.0".to_string(),
                    },
                ],
            }],
            notices,
        )
    }

    #[test]
    fn test_plain_text_sections() {
        let output = TextFormatter::new(false).format(&response(vec![])).unwrap();

        assert!(output.starts_with("Migration roadmap for net8.0 (keeping net6.0)"));
        assert!(output.contains("  Packages:  3 (1 internal)"));
        assert!(output.contains("  Stage 1: Contoso.App"));
        assert!(output.contains("    1. Legacy 1.0.0 [blocked]"));
        assert!(output.contains("    3. Contoso.App 1.0.0 [partial] (internal)"));
        assert!(output.contains("Cycles broken at: Dual -> Contoso.App"));
        assert!(output.contains("  - Legacy 1.0.0: declares net472"));
        assert!(output.contains("  - Dual: net8.0 -> 2.0.0, net6.0 -> 1.0.0"));
        assert!(output.contains("  - legacy: 1.0.0 by Contoso.App, 2.0.0 by Dual"));
        assert!(!output.contains("Notices"));
    }

    #[test]
    fn test_plain_text_has_no_escape_codes() {
        let output = TextFormatter::new(false).format(&response(vec![])).unwrap();
        assert!(!output.contains('\u{1b}'));
    }

    #[test]
    fn test_colored_output_uses_escape_codes() {
        let output = TextFormatter::new(true).format(&response(vec![])).unwrap();
        assert!(output.contains('\u{1b}'));
    }

    #[test]
    fn test_notices_are_listed() {
        let output = TextFormatter::new(false)
            .format(&response(vec!["Registry unreachable".to_string()]))
            .unwrap();
        assert!(output.contains("Notices\n  - Registry unreachable"));
    }

    #[test]
    fn test_empty_response() {
        let response = AnalysisResponse::new(
            AnalysisMetadata::for_run("net8.0", &[]),
            vec![],
            MigrationOrder::default(),
            vec![],
            vec![],
            vec![],
        );
        let output = TextFormatter::new(false).format(&response).unwrap();
        assert!(output.contains("Stages\n  (none)"));
        assert!(!output.contains("Blocked packages"));
    }
}
