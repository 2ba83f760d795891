use std::sync::Arc;

/// Callback receiving `(current, total)` package counts while the tree loads.
///
/// `total` grows as new dependencies are discovered, so consumers must not
/// assume it is final until loading completes.
pub type LoadProgressCallback = Arc<dyn Fn(usize, usize) + Send + Sync>;

/// ProgressReporter port for reporting progress during operations
///
/// This port abstracts progress reporting (e.g., to stderr)
/// to provide user feedback during long-running operations.
pub trait ProgressReporter {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress with a position and a (possibly growing) total
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports an error or warning message
    fn report_error(&self, message: &str);

    /// Reports completion of an operation
    fn report_completion(&self, message: &str);
}
