use super::finding::Finding;
use std::fmt;
use thiserror::Error;

/// Policy verdict for one finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Passed,
    Failed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Passed => write!(f, "PASSED"),
            Verdict::Failed => write!(f, "FAILED"),
        }
    }
}

/// A finding together with its verdict and the reason for it
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedFinding {
    pub finding: Finding,
    pub verdict: Verdict,
    pub reason: String,
    pub matched_allowlist_pattern: Option<String>,
    /// `"<package_name>@<package_version>"`
    pub package_key: String,
}

impl EvaluatedFinding {
    pub fn is_failed(&self) -> bool {
        self.verdict == Verdict::Failed
    }

    pub fn is_allowlisted(&self) -> bool {
        self.matched_allowlist_pattern.is_some()
    }
}

/// Reasons a finding cannot be classified
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FindingError {
    #[error("finding {finding} has no value for required attribute '{attribute}'")]
    MissingAttribute { finding: String, attribute: String },
}

/// A finding that could not be classified, kept for reporting
#[derive(Debug, Clone, PartialEq)]
pub struct FindingProcessingError {
    pub finding: Finding,
    pub error: FindingError,
}
