use crate::application::dto::AnalysisResponse;
use crate::ports::outbound::ReportFormatter;
use crate::shared::Result;

/// JsonFormatter adapter - the complete analysis as a pretty-printed JSON document
///
/// Field names are camelCase; the annotated tree is emitted in full,
/// including shared-reference and cyclic occurrences.
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, response: &AnalysisResponse) -> Result<String> {
        Ok(serde_json::to_string_pretty(response)?)
    }
}
