//! ECR JSON 1.1 request and response shapes
//!
//! Shared by the HTTP client and the snapshot registry, which reads the
//! same documents from disk.

use crate::scan_audit::domain::{
    Finding, FindingSeverity, ImageDetail, ImageIdentifier, RepositoryRef, ScanFindings,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeRepositoriesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<&'a str>,
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListImagesFilter {
    pub tag_status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListImagesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<&'a str>,
    pub repository_name: &'a str,
    pub filter: ListImagesFilter,
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageIdDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_digest: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_tag: Option<String>,
}

impl ImageIdDto {
    pub fn for_tag(tag: &str) -> Self {
        Self {
            image_digest: None,
            image_tag: Some(tag.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeImagesRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<&'a str>,
    pub repository_name: &'a str,
    pub image_ids: Vec<ImageIdDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeImageScanFindingsRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_id: Option<&'a str>,
    pub repository_name: &'a str,
    pub image_id: ImageIdDto,
    pub max_results: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RepositoryDto {
    pub repository_name: String,
    #[serde(default)]
    pub registry_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeRepositoriesResponse {
    #[serde(default)]
    pub repositories: Vec<RepositoryDto>,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListImagesResponse {
    #[serde(default)]
    pub image_ids: Vec<ImageIdDto>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Timestamps are epoch seconds on the wire and RFC 3339 strings in AWS CLI output
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum TimestampDto {
    EpochSeconds(f64),
    Text(String),
}

impl TimestampDto {
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            TimestampDto::EpochSeconds(seconds) => {
                let whole = seconds.floor();
                let nanos = ((seconds - whole) * 1_000_000_000.0).round() as u32;
                DateTime::from_timestamp(whole as i64, nanos.min(999_999_999))
            }
            TimestampDto::Text(text) => DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageDetailDto {
    #[serde(default)]
    pub image_tags: Vec<String>,
    #[serde(default)]
    pub image_pushed_at: Option<TimestampDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeImagesResponse {
    #[serde(default)]
    pub image_details: Vec<ImageDetailDto>,
    #[serde(default)]
    pub next_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageScanStatusDto {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AttributeDto {
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FindingDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDto>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ImageScanFindingsDto {
    #[serde(default)]
    pub findings: Vec<FindingDto>,
    #[serde(default)]
    pub finding_severity_counts: HashMap<String, u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DescribeImageScanFindingsResponse {
    #[serde(default)]
    pub image_scan_status: Option<ImageScanStatusDto>,
    #[serde(default)]
    pub image_scan_findings: Option<ImageScanFindingsDto>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// Error body of a failed call: `{"__type": "...#RepositoryNotFoundException", "message": "..."}`
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "__type", default)]
    pub error_type: Option<String>,
    #[serde(alias = "Message", default)]
    pub message: Option<String>,
}

// ============================================================================
// Conversions into the domain model
// ============================================================================

impl RepositoryDto {
    pub fn into_domain(self) -> RepositoryRef {
        RepositoryRef::new(self.registry_id, self.repository_name)
    }
}

/// Tags of tagged images; untagged entries are skipped
pub(crate) fn identifiers_from(image_ids: Vec<ImageIdDto>) -> Vec<ImageIdentifier> {
    image_ids
        .into_iter()
        .filter_map(|id| id.image_tag)
        .filter(|tag| !tag.is_empty())
        .map(ImageIdentifier::new)
        .collect()
}

/// One `ImageDetail` per requested tag, in request order
///
/// An image carrying several tags is reported once per requested tag.
/// Tags without a parseable push timestamp are dropped.
pub(crate) fn details_for(
    details: &[ImageDetailDto],
    requested: &[ImageIdentifier],
) -> Vec<ImageDetail> {
    let mut pushed: HashMap<&str, DateTime<Utc>> = HashMap::new();
    for detail in details {
        let Some(pushed_at) = detail.image_pushed_at.as_ref().and_then(TimestampDto::to_datetime)
        else {
            log::warn!("Skipping image {:?} without a push timestamp", detail.image_tags);
            continue;
        };
        for tag in &detail.image_tags {
            pushed.entry(tag.as_str()).or_insert(pushed_at);
        }
    }

    requested
        .iter()
        .filter_map(|id| {
            pushed
                .get(id.tag.as_str())
                .map(|pushed_at| ImageDetail::new(id.tag.as_str(), *pushed_at))
        })
        .collect()
}

impl FindingDto {
    pub fn into_domain(self) -> Finding {
        let mut finding = Finding::new(
            self.name.unwrap_or_default(),
            FindingSeverity::parse(self.severity.as_deref().unwrap_or_default()),
        );
        finding.description = self.description.filter(|d| !d.is_empty());
        finding.uri = self.uri.filter(|u| !u.is_empty());
        finding.attributes = self
            .attributes
            .into_iter()
            .map(|a| (a.key, a.value.unwrap_or_default()))
            .collect::<BTreeMap<_, _>>();
        finding
    }
}

/// Status string of a scan whose findings can be evaluated
const SCAN_COMPLETE: &str = "COMPLETE";

/// Builds `ScanFindings` from every page of a findings response
pub(crate) fn scan_findings_from(pages: Vec<DescribeImageScanFindingsResponse>) -> ScanFindings {
    let mut status: Option<ImageScanStatusDto> = None;
    let mut findings = Vec::new();
    let mut severity_counts = HashMap::new();

    for (index, page) in pages.into_iter().enumerate() {
        if index == 0 {
            status = page.image_scan_status;
            if let Some(scan) = &page.image_scan_findings {
                severity_counts = scan.finding_severity_counts.clone();
            }
        }
        if let Some(scan) = page.image_scan_findings {
            findings.extend(scan.findings.into_iter().map(FindingDto::into_domain));
        }
    }

    let status_value = status.as_ref().and_then(|s| s.status.clone());
    match status_value.as_deref() {
        None | Some(SCAN_COMPLETE) => ScanFindings::succeeded(findings, severity_counts),
        Some(other) => {
            let description = status
                .and_then(|s| s.description)
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| "no description provided".to_string());
            ScanFindings::failed(format!("scan status {}: {}", other, description))
        }
    }
}
