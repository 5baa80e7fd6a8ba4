use crate::scan_audit::domain::ImageReport;
use crate::shared::Result;

/// ReportFormatter port for rendering one image report
pub trait ReportFormatter {
    /// Renders the report as a document
    ///
    /// # Errors
    /// Returns an error if serialization fails
    fn format(&self, report: &ImageReport) -> Result<String>;

    /// File extension, without the dot, of documents produced by this formatter
    fn file_extension(&self) -> &'static str;
}
