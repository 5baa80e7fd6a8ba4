use crate::ports::outbound::ReportFormatter;
use crate::scan_audit::domain::{EvaluatedFinding, FindingProcessingError, ImageReport};
use crate::shared::Result;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    component: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    cutoff: String,
    #[serde(rename = "totalFindings")]
    total_findings: usize,
    failures: usize,
    errors: usize,
    #[serde(rename = "undefinedSeverities")]
    undefined_severities: usize,
    #[serde(rename = "scanError", skip_serializing_if = "Option::is_none")]
    scan_error: Option<&'a str>,
    findings: Vec<JsonFinding<'a>>,
    #[serde(rename = "processingErrors", skip_serializing_if = "Vec::is_empty")]
    processing_errors: Vec<JsonProcessingError<'a>>,
}

#[derive(Debug, Serialize)]
struct JsonFinding<'a> {
    name: &'a str,
    severity: String,
    package: &'a str,
    verdict: String,
    reason: &'a str,
    #[serde(rename = "allowlistedBy", skip_serializing_if = "Option::is_none")]
    allowlisted_by: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    uri: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct JsonProcessingError<'a> {
    name: &'a str,
    error: String,
    attributes: &'a BTreeMap<String, String>,
}

/// JsonFormatter adapter rendering an `ImageReport` as pretty-printed JSON
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }

    fn build_finding(evaluated: &EvaluatedFinding) -> JsonFinding<'_> {
        JsonFinding {
            name: &evaluated.finding.name,
            severity: evaluated.finding.severity.to_string(),
            package: &evaluated.package_key,
            verdict: evaluated.verdict.to_string(),
            reason: &evaluated.reason,
            allowlisted_by: evaluated.matched_allowlist_pattern.as_deref(),
            uri: evaluated.finding.uri.as_deref(),
        }
    }

    fn build_processing_error(error: &FindingProcessingError) -> JsonProcessingError<'_> {
        JsonProcessingError {
            name: &error.finding.name,
            error: error.error.to_string(),
            attributes: &error.finding.attributes,
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &ImageReport) -> Result<String> {
        let json = JsonReport {
            component: &report.image_name,
            image: report.image.as_ref().map(ToString::to_string),
            cutoff: report.cutoff.to_string(),
            total_findings: report.total_findings,
            failures: report.failure_count,
            errors: report.error_count(),
            undefined_severities: report.undefined_severity_count,
            scan_error: report.scan_error.as_deref(),
            findings: report
                .evaluated_findings
                .iter()
                .map(Self::build_finding)
                .collect(),
            processing_errors: report
                .processing_errors
                .iter()
                .map(Self::build_processing_error)
                .collect(),
        };

        let mut output = serde_json::to_string_pretty(&json)?;
        output.push('\n');
        Ok(output)
    }

    fn file_extension(&self) -> &'static str {
        "json"
    }
}
