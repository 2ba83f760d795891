use crate::shared::Result;

/// OutputPresenter port for presenting final output
///
/// This port abstracts the output destination (stdout, file, etc.)
/// where the formatted roadmap report is presented.
pub trait OutputPresenter {
    /// Presents the formatted report to the output destination
    ///
    /// # Errors
    /// Returns an error if:
    /// - Writing to the output destination fails
    /// - File permissions prevent writing
    fn present(&self, content: &str) -> Result<()>;
}
