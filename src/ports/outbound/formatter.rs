use crate::application::dto::AnalysisResponse;
use crate::shared::Result;

/// ReportFormatter port for rendering an analysis result
///
/// This port abstracts the rendering of a finished analysis into a
/// concrete output format (JSON document, plain-text roadmap, ...).
pub trait ReportFormatter {
    /// Formats the analysis response
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, response: &AnalysisResponse) -> Result<String>;
}
