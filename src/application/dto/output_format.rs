use serde::{Deserialize, Serialize};

/// Output format enumeration for the migration report
///
/// Both the CLI (inbound adapter) and the formatters (outbound adapters)
/// need to understand it, so it lives in the application layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Full annotated tree as JSON (default)
    #[default]
    Json,
    /// Human-readable roadmap summary
    Text,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "text" | "txt" => Ok(OutputFormat::Text),
            _ => Err(format!(
                "Invalid format: {}. Please specify 'json' or 'text'",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}
