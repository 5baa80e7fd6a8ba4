use super::severity::{FindingSeverity, SeverityLevel};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Attribute key holding the affected package name
pub const PACKAGE_NAME_ATTRIBUTE: &str = "package_name";

/// Attribute key holding the affected package version
pub const PACKAGE_VERSION_ATTRIBUTE: &str = "package_version";

/// One reported vulnerability instance inside a scanned image
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub name: String,
    pub severity: FindingSeverity,
    pub description: Option<String>,
    pub uri: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl Finding {
    pub fn new(name: impl Into<String>, severity: FindingSeverity) -> Self {
        Self {
            name: name.into(),
            severity,
            description: None,
            uri: None,
            attributes: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = Some(uri.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Shorthand for a finding on `package@version`
    pub fn with_package(self, name: &str, version: &str) -> Self {
        self.with_attribute(PACKAGE_NAME_ATTRIBUTE, name)
            .with_attribute(PACKAGE_VERSION_ATTRIBUTE, version)
    }

    /// Returns the attribute value, treating an empty value as absent
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Outcome of the scan retrieval for one image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Succeeded,
    Failed,
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanStatus::Succeeded => write!(f, "SUCCEEDED"),
            ScanStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Scan findings for one image, as returned by the scanner
#[derive(Debug, Clone, PartialEq)]
pub struct ScanFindings {
    pub status: ScanStatus,
    pub status_description: Option<String>,
    pub findings: Vec<Finding>,
    /// Scanner-supplied histogram keyed by raw severity string
    pub severity_counts: HashMap<String, u64>,
}

impl ScanFindings {
    pub fn succeeded(findings: Vec<Finding>, severity_counts: HashMap<String, u64>) -> Self {
        Self {
            status: ScanStatus::Succeeded,
            status_description: None,
            findings,
            severity_counts,
        }
    }

    /// Synthetic result recorded when retrieval for an image failed
    pub fn failed(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "scan retrieval failed".to_string()
        } else {
            message
        };
        Self {
            status: ScanStatus::Failed,
            status_description: Some(message),
            findings: Vec::new(),
            severity_counts: HashMap::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == ScanStatus::Failed
    }

    /// Histogram recomputed from the findings themselves
    pub fn derived_severity_counts(&self) -> HashMap<String, u64> {
        let mut counts = HashMap::new();
        for finding in &self.findings {
            let key = match &finding.severity {
                FindingSeverity::Known(level) => level.as_str().to_string(),
                FindingSeverity::Undefined(_) => "UNDEFINED".to_string(),
            };
            *counts.entry(key).or_insert(0) += 1;
        }
        counts
    }

    /// Returns true when the scanner histogram agrees with the findings list
    ///
    /// Zero entries are ignored on both sides.
    pub fn severity_counts_consistent(&self) -> bool {
        let derived = self.derived_severity_counts();
        let normalize = |counts: &HashMap<String, u64>| -> BTreeMap<String, u64> {
            counts
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(key, count)| {
                    let key = match key.parse::<SeverityLevel>() {
                        Ok(level) => level.as_str().to_string(),
                        Err(_) => "UNDEFINED".to_string(),
                    };
                    (key, *count)
                })
                .fold(BTreeMap::new(), |mut acc, (key, count)| {
                    *acc.entry(key).or_insert(0) += count;
                    acc
                })
        };
        normalize(&self.severity_counts) == normalize(&derived)
    }
}
