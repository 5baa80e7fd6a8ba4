use crate::scan_audit::domain::ImageReport;

/// ProgressReporter port for reporting progress during an audit run
///
/// This port abstracts user feedback (e.g., to stderr) so reports written
/// to disk and stdout stay clean. Calls may arrive from concurrently
/// running image tasks.
pub trait ProgressReporter: Send + Sync {
    /// Reports a progress message
    fn report(&self, message: &str);

    /// Reports progress through a batch
    ///
    /// # Arguments
    /// * `current` - Images completed so far
    /// * `total` - Images in the batch
    /// * `message` - Optional message, typically the component just finished
    fn report_progress(&self, current: usize, total: usize, message: Option<&str>);

    /// Reports an error or warning message
    fn report_error(&self, message: &str);

    /// Reports completion of the run
    fn report_completion(&self, message: &str);

    /// Presents the per-image outcome of the run
    fn report_summary(&self, reports: &[ImageReport]);
}
