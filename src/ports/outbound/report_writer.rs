use crate::shared::Result;
use std::path::PathBuf;

/// ReportWriter port for persisting rendered reports
pub trait ReportWriter {
    /// Writes one report for `component`
    ///
    /// # Arguments
    /// * `component` - Component name, used as the report's directory
    /// * `file_name` - File name inside that directory
    /// * `content` - Rendered report
    ///
    /// # Returns
    /// The path the report was written to
    fn write_report(&self, component: &str, file_name: &str, content: &str) -> Result<PathBuf>;
}
