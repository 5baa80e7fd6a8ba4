use crate::scan_audit::domain::ImageReport;

/// AuditResponse - Result of one audit run
///
/// Holds one report per audited image, ordered by component name.
#[derive(Debug, Clone)]
pub struct AuditResponse {
    pub reports: Vec<ImageReport>,
}

impl AuditResponse {
    pub fn new(mut reports: Vec<ImageReport>) -> Self {
        reports.sort_by(|a, b| a.image_name.cmp(&b.image_name));
        Self { reports }
    }

    /// Failing findings across all images
    pub fn total_failures(&self) -> usize {
        self.reports.iter().map(|r| r.failure_count).sum()
    }

    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(ImageReport::has_failures)
    }

    /// Number of images whose scan results could not be retrieved
    pub fn scan_error_count(&self) -> usize {
        self.reports.iter().filter(|r| r.is_scan_failed()).count()
    }

    pub fn has_scan_errors(&self) -> bool {
        self.scan_error_count() > 0
    }
}
