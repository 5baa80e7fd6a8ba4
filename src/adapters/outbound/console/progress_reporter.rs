use crate::ports::outbound::ProgressReporter;
use crate::scan_audit::domain::ImageReport;
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::sync::Mutex;

const PROGRESS_TEMPLATE: &str =
    "   {spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) - {msg}";

/// StderrProgressReporter adapter for reporting progress to stderr
///
/// This adapter implements the ProgressReporter port, writing progress
/// information to stderr so it doesn't interfere with stdout output.
/// Uses indicatif for the batch progress bar; the bar is shared by all
/// concurrently running image tasks.
pub struct StderrProgressReporter {
    progress_bar: Mutex<Option<ProgressBar>>,
}

impl StderrProgressReporter {
    pub fn new() -> Self {
        Self {
            progress_bar: Mutex::new(None),
        }
    }

    fn get_or_create_progress_bar(&self, total: usize) -> Option<ProgressBar> {
        let mut pb_option = self.progress_bar.lock().ok()?;
        if let Some(pb) = pb_option.as_ref() {
            return Some(pb.clone());
        }

        let pb = ProgressBar::new(total as u64);
        match ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
            Ok(style) => pb.set_style(style.progress_chars("=>-")),
            Err(e) => log::debug!("Falling back to the default progress style: {}", e),
        }
        *pb_option = Some(pb.clone());
        Some(pb)
    }

    fn finish_progress_bar(&self) {
        if let Ok(mut pb_option) = self.progress_bar.lock() {
            if let Some(pb) = pb_option.take() {
                pb.finish_and_clear();
            }
        }
    }

    /// Renders the summary table
    fn summary_lines(reports: &[ImageReport]) -> Vec<String> {
        let name_width = reports
            .iter()
            .map(|r| r.image_name.len())
            .chain(std::iter::once("Component".len()))
            .max()
            .unwrap_or_default();
        let tag_width = reports
            .iter()
            .map(|r| r.tag().map_or(1, str::len))
            .chain(std::iter::once("Tag".len()))
            .max()
            .unwrap_or_default();

        let mut lines = Vec::with_capacity(reports.len() + 1);
        lines.push(format!(
            "   {:<name_width$}  {:<tag_width$}  {:>6}  {:>8}  {:>6}  Status",
            "Component", "Tag", "Tests", "Failures", "Errors",
        ));
        for report in reports {
            let status = if report.is_scan_failed() {
                "SCAN ERROR".yellow().bold().to_string()
            } else if report.has_failures() {
                "FAILED".red().bold().to_string()
            } else if report.error_count() > 0 {
                "ERRORS".yellow().to_string()
            } else {
                "PASSED".green().to_string()
            };
            lines.push(format!(
                "   {:<name_width$}  {:<tag_width$}  {:>6}  {:>8}  {:>6}  {}",
                report.image_name,
                report.tag().unwrap_or("-"),
                report.total_findings,
                report.failure_count,
                report.error_count(),
                status,
            ));
        }
        lines
    }
}

impl Default for StderrProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for StderrProgressReporter {
    fn report(&self, message: &str) {
        eprintln!("{}", message);
    }

    fn report_progress(&self, current: usize, total: usize, message: Option<&str>) {
        let Some(pb) = self.get_or_create_progress_bar(total) else {
            return;
        };
        pb.set_position(current as u64);
        if let Some(msg) = message {
            pb.set_message(msg.to_string());
        }
    }

    fn report_error(&self, message: &str) {
        if let Ok(pb_option) = self.progress_bar.lock() {
            if let Some(pb) = pb_option.as_ref() {
                pb.suspend(|| eprintln!("{}", message));
                return;
            }
        }
        eprintln!("{}", message);
    }

    fn report_completion(&self, message: &str) {
        self.finish_progress_bar();
        eprintln!();
        eprintln!("{}", message);
    }

    fn report_summary(&self, reports: &[ImageReport]) {
        self.finish_progress_bar();
        if reports.is_empty() {
            return;
        }
        eprintln!();
        eprintln!("📊 Audit summary:");
        for line in Self::summary_lines(reports) {
            eprintln!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan_audit::domain::SeverityLevel;

    fn report(name: &str, failures: usize, scan_error: Option<&str>) -> ImageReport {
        ImageReport {
            image_name: name.to_string(),
            image: None,
            cutoff: SeverityLevel::Medium,
            total_findings: failures,
            failure_count: failures,
            undefined_severity_count: 0,
            evaluated_findings: Vec::new(),
            processing_errors: Vec::new(),
            scan_error: scan_error.map(str::to_string),
        }
    }

    #[test]
    fn test_progress_reporter_creation() {
        let reporter = StderrProgressReporter::new();
        // Can't easily test stderr output, but verify it doesn't panic
        reporter.report("Test message");
        reporter.report_progress(5, 10, Some("test"));
        reporter.report_error("Test error");
        reporter.report_completion("Test completion");
    }

    #[test]
    fn test_progress_reporter_default() {
        let reporter = StderrProgressReporter::default();
        reporter.report("Test message");
        reporter.report_summary(&[]);
    }

    #[test]
    fn test_summary_lines() {
        let reports = vec![
            report("api-gateway", 2, None),
            report("nexus", 0, Some("scan not found")),
        ];
        let lines = StderrProgressReporter::summary_lines(&reports);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("Component"));
        assert!(lines[1].contains("api-gateway"));
        assert!(lines[1].contains("FAILED"));
        assert!(lines[2].contains("SCAN ERROR"));
    }
}
