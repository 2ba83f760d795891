use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

/// AnalysisMetadata value object describing one analysis run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    timestamp: String,
    tool_name: String,
    tool_version: String,
    run_id: String,
    target_framework: String,
    current_frameworks: Vec<String>,
}

impl AnalysisMetadata {
    /// Generates metadata with the current timestamp and a fresh run id
    pub fn generate(
        tool_name: &str,
        tool_version: &str,
        target_framework: &str,
        current_frameworks: &[String],
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            tool_name: tool_name.to_string(),
            tool_version: tool_version.to_string(),
            run_id: format!("urn:uuid:{}", Uuid::new_v4()),
            target_framework: target_framework.to_string(),
            current_frameworks: current_frameworks.to_vec(),
        }
    }

    /// Generates metadata with this tool's name and compile-time version
    pub fn for_run(target_framework: &str, current_frameworks: &[String]) -> Self {
        Self::generate(
            "nuget-roadmap",
            env!("CARGO_PKG_VERSION"),
            target_framework,
            current_frameworks,
        )
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub fn tool_version(&self) -> &str {
        &self.tool_version
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn target_framework(&self) -> &str {
        &self.target_framework
    }

    pub fn current_frameworks(&self) -> &[String] {
        &self.current_frameworks
    }
}
