use crate::adapters::outbound::formatters::{JsonFormatter, JunitFormatter};
use crate::application::dto::ReportFormat;
use crate::ports::outbound::ReportFormatter;

/// Factory for creating report formatters
///
/// This factory encapsulates the creation logic for different formatter implementations,
/// following the Factory Pattern. It belongs in the application layer as it orchestrates
/// the selection of infrastructure adapters based on application needs.
pub struct FormatterFactory;

impl FormatterFactory {
    /// Creates a formatter instance for the specified report format
    ///
    /// # Examples
    /// ```
    /// use ecr_scan_audit::application::dto::ReportFormat;
    /// use ecr_scan_audit::application::factories::FormatterFactory;
    ///
    /// let formatter = FormatterFactory::create(ReportFormat::Junit);
    /// assert_eq!(formatter.file_extension(), "xml");
    /// ```
    pub fn create(format: ReportFormat) -> Box<dyn ReportFormatter> {
        match format {
            ReportFormat::Junit => Box::new(JunitFormatter::new()),
            ReportFormat::Json => Box::new(JsonFormatter::new()),
        }
    }

    /// Returns the progress message for the specified report format
    pub fn progress_message(format: ReportFormat) -> &'static str {
        match format {
            ReportFormat::Junit => "📝 Writing JUnit XML reports...",
            ReportFormat::Json => "📝 Writing JSON reports...",
        }
    }

    /// File name of every report written in the given format
    pub fn report_file_name(format: ReportFormat) -> String {
        format!("report.{}", Self::create(format).file_extension())
    }
}
