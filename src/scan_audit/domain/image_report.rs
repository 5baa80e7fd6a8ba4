use super::evaluation::{EvaluatedFinding, FindingProcessingError};
use super::image::ImageIdentity;
use super::severity::SeverityLevel;

/// Aggregate audit record for one image, ready for serialization
///
/// Built by `ReportAssembler`; the count fields are always derived from the
/// evaluated findings so they cannot drift from the verdicts.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageReport {
    pub image_name: String,
    pub image: Option<ImageIdentity>,
    pub cutoff: SeverityLevel,
    pub total_findings: usize,
    pub failure_count: usize,
    pub undefined_severity_count: usize,
    pub evaluated_findings: Vec<EvaluatedFinding>,
    pub processing_errors: Vec<FindingProcessingError>,
    /// Set when the image's scan results could not be retrieved
    pub scan_error: Option<String>,
}

impl ImageReport {
    /// Suite-level error count: unrecognized severities, unclassifiable findings
    /// and a failed scan retrieval
    pub fn error_count(&self) -> usize {
        self.undefined_severity_count
            + self.processing_errors.len()
            + usize::from(self.scan_error.is_some())
    }

    pub fn has_failures(&self) -> bool {
        self.failure_count > 0
    }

    pub fn is_scan_failed(&self) -> bool {
        self.scan_error.is_some()
    }

    pub fn tag(&self) -> Option<&str> {
        self.image.as_ref().map(ImageIdentity::tag)
    }
}
