use crate::adapters::outbound::formatters::{JsonFormatter, TextFormatter};
use crate::application::dto::OutputFormat;
use crate::ports::outbound::ReportFormatter;

/// Factory for creating report formatters
///
/// This factory encapsulates the creation logic for different formatter implementations,
/// following the Factory Pattern. It belongs in the application layer as it orchestrates
/// the selection of infrastructure adapters based on application needs.
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter instance for the specified output format
    ///
    /// # Arguments
    /// * `format` - The output format to create a formatter for
    /// * `use_color` - Whether the text formatter may emit ANSI colors
    ///
    /// # Examples
    /// ```
    /// use nuget_roadmap::application::dto::OutputFormat;
    /// use nuget_roadmap::application::factories::FormatterFactory;
    ///
    /// let formatter = FormatterFactory::create(OutputFormat::Json, false);
    /// ```
    pub fn create(format: OutputFormat, use_color: bool) -> Box<dyn ReportFormatter> {
        match format {
            OutputFormat::Json => Box::new(JsonFormatter::new()),
            OutputFormat::Text => Box::new(TextFormatter::new(use_color)),
        }
    }

    /// Returns the progress message for the specified output format
    ///
    /// # Examples
    /// ```
    /// use nuget_roadmap::application::dto::OutputFormat;
    /// use nuget_roadmap::application::factories::FormatterFactory;
    ///
    /// let message = FormatterFactory::progress_message(OutputFormat::Text);
    /// assert_eq!(message, "📝 Generating text roadmap...");
    /// ```
    pub fn progress_message(format: OutputFormat) -> &'static str {
        match format {
            OutputFormat::Json => "📝 Generating JSON report...",
            OutputFormat::Text => "📝 Generating text roadmap...",
        }
    }
}
