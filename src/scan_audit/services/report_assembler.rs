use super::policy_evaluator::PolicyEvaluator;
use crate::scan_audit::domain::{
    Allowlist, AllowlistIndex, Finding, FindingProcessingError, ImageIdentity, ImageReport,
    ScanFindings, SeverityLevel,
};

/// ReportAssembler - Folds evaluated findings for one image into an `ImageReport`
///
/// Counts are always taken from the per-finding verdicts. The scanner's
/// severity histogram is only compared against them for diagnostics.
pub struct ReportAssembler;

impl ReportAssembler {
    /// Evaluates every finding in input order and builds the report
    ///
    /// `image_name` is the component name; it selects the component section
    /// of the allowlist.
    pub fn assemble(
        image_name: &str,
        cutoff: SeverityLevel,
        findings: &[Finding],
        allowlist: &Allowlist,
    ) -> ImageReport {
        let index = AllowlistIndex::for_component(allowlist, image_name);
        let mut evaluated_findings = Vec::with_capacity(findings.len());
        let mut processing_errors = Vec::new();

        for finding in findings {
            match PolicyEvaluator::evaluate(finding, cutoff, &index) {
                Ok(evaluated) => evaluated_findings.push(evaluated),
                Err(error) => {
                    log::warn!("{}: {}", image_name, error);
                    processing_errors.push(FindingProcessingError {
                        finding: finding.clone(),
                        error,
                    });
                }
            }
        }

        let failure_count = evaluated_findings.iter().filter(|e| e.is_failed()).count();
        // Findings already in processing_errors are not counted again
        let undefined_severity_count = evaluated_findings
            .iter()
            .filter(|e| e.finding.severity.is_undefined())
            .count();

        ImageReport {
            image_name: image_name.to_string(),
            image: None,
            cutoff,
            total_findings: findings.len(),
            failure_count,
            undefined_severity_count,
            evaluated_findings,
            processing_errors,
            scan_error: None,
        }
    }

    /// Report for an image whose scan results could not be retrieved
    pub fn assemble_failed_scan(
        image_name: &str,
        cutoff: SeverityLevel,
        message: impl Into<String>,
    ) -> ImageReport {
        let message = message.into();
        let message = if message.trim().is_empty() {
            "scan retrieval failed".to_string()
        } else {
            message
        };

        ImageReport {
            image_name: image_name.to_string(),
            image: None,
            cutoff,
            total_findings: 0,
            failure_count: 0,
            undefined_severity_count: 0,
            evaluated_findings: Vec::new(),
            processing_errors: Vec::new(),
            scan_error: Some(message),
        }
    }

    /// Builds the report for one aggregator result
    ///
    /// Failed scans become a failed-scan report. For successful scans the
    /// scanner histogram is cross-checked and a warning is logged on mismatch.
    pub fn from_scan(
        image_name: &str,
        image: Option<ImageIdentity>,
        cutoff: SeverityLevel,
        scan: &ScanFindings,
        allowlist: &Allowlist,
    ) -> ImageReport {
        let mut report = if scan.is_failed() {
            Self::assemble_failed_scan(
                image_name,
                cutoff,
                scan.status_description.clone().unwrap_or_default(),
            )
        } else {
            if !scan.severity_counts.is_empty() && !scan.severity_counts_consistent() {
                log::warn!(
                    "{}: scanner severity counts {:?} disagree with the {} findings returned; using per-finding counts",
                    image_name,
                    scan.severity_counts,
                    scan.findings.len()
                );
            }
            Self::assemble(image_name, cutoff, &scan.findings, allowlist)
        };
        report.image = image;
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scan_audit::domain::{FindingSeverity, Verdict};
    use std::collections::HashMap;

    fn finding(name: &str, severity: SeverityLevel, package: &str, version: &str) -> Finding {
        Finding::new(name, severity.into()).with_package(package, version)
    }

    #[test]
    fn test_scenario_high_finding_no_allowlist() {
        let findings = vec![finding("CVE-2014-0160", SeverityLevel::High, "openssl", "1.0.1")];
        let report =
            ReportAssembler::assemble("nexus", SeverityLevel::Medium, &findings, &Allowlist::empty());
        assert_eq!(report.total_findings, 1);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.evaluated_findings[0].verdict, Verdict::Failed);
    }

    #[test]
    fn test_scenario_global_allowlist_match() {
        let findings = vec![finding("CVE-2014-0160", SeverityLevel::High, "openssl", "1.0.1")];
        let allowlist = Allowlist::new(vec!["openssl@1.0.1".to_string()], HashMap::new());
        let report = ReportAssembler::assemble("nexus", SeverityLevel::Medium, &findings, &allowlist);
        assert_eq!(report.failure_count, 0);
        let evaluated = &report.evaluated_findings[0];
        assert_eq!(evaluated.verdict, Verdict::Passed);
        assert_eq!(
            evaluated.matched_allowlist_pattern.as_deref(),
            Some("openssl@1.0.1")
        );
    }

    #[test]
    fn test_scenario_critical_at_critical_cutoff() {
        let findings = vec![finding("CVE-1", SeverityLevel::Critical, "glibc", "2.28")];
        let report = ReportAssembler::assemble(
            "nexus",
            SeverityLevel::Critical,
            &findings,
            &Allowlist::empty(),
        );
        assert_eq!(report.failure_count, 1);
    }

    #[test]
    fn test_component_allowlist_applies_only_to_its_component() {
        let findings = vec![finding("CVE-1", SeverityLevel::High, "curl", "7.64")];
        let allowlist = Allowlist::new(
            vec![],
            HashMap::from([("api".to_string(), vec!["curl".to_string()])]),
        );
        let api = ReportAssembler::assemble("api", SeverityLevel::Low, &findings, &allowlist);
        let web = ReportAssembler::assemble("web", SeverityLevel::Low, &findings, &allowlist);
        assert_eq!(api.failure_count, 0);
        assert_eq!(web.failure_count, 1);
    }

    #[test]
    fn test_failure_count_matches_verdicts() {
        let findings = vec![
            finding("a", SeverityLevel::Critical, "openssl", "1.0.1"),
            finding("b", SeverityLevel::High, "glibc", "2.28"),
            finding("c", SeverityLevel::Low, "bash", "5"),
            finding("d", SeverityLevel::Medium, "zlib", "1.2"),
            Finding::new("e", FindingSeverity::parse("UNDEFINED")).with_package("tar", "1"),
        ];
        let allowlist = Allowlist::new(vec!["openssl".to_string()], HashMap::new());
        for cutoff in SeverityLevel::ALL {
            let report = ReportAssembler::assemble("nexus", cutoff, &findings, &allowlist);
            let failed = report
                .evaluated_findings
                .iter()
                .filter(|e| e.verdict == Verdict::Failed)
                .count();
            assert_eq!(report.failure_count, failed, "cutoff {}", cutoff);
            assert_eq!(report.total_findings, 5);
        }
    }

    #[test]
    fn test_preserves_input_order() {
        let findings = vec![
            finding("z", SeverityLevel::Low, "a", "1"),
            finding("y", SeverityLevel::High, "b", "1"),
            finding("x", SeverityLevel::Medium, "c", "1"),
        ];
        let report =
            ReportAssembler::assemble("nexus", SeverityLevel::Low, &findings, &Allowlist::empty());
        let names: Vec<_> = report
            .evaluated_findings
            .iter()
            .map(|e| e.finding.name.as_str())
            .collect();
        assert_eq!(names, vec!["z", "y", "x"]);
    }

    #[test]
    fn test_undefined_severity_counted_as_error() {
        let findings = vec![
            Finding::new("u", FindingSeverity::parse("UNDEFINED")).with_package("tar", "1"),
            finding("h", SeverityLevel::High, "bash", "5"),
        ];
        let report =
            ReportAssembler::assemble("nexus", SeverityLevel::Medium, &findings, &Allowlist::empty());
        assert_eq!(report.undefined_severity_count, 1);
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_undefined_severity_without_package_counted_once() {
        let findings = vec![Finding::new("u", FindingSeverity::parse("UNDEFINED"))];
        let report =
            ReportAssembler::assemble("nexus", SeverityLevel::Medium, &findings, &Allowlist::empty());
        assert_eq!(report.total_findings, 1);
        assert_eq!(report.processing_errors.len(), 1);
        assert_eq!(report.undefined_severity_count, 0);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_missing_attribute_collected_as_processing_error() {
        let findings = vec![
            Finding::new("broken", SeverityLevel::Critical.into()),
            finding("ok", SeverityLevel::Critical, "bash", "5"),
        ];
        let report =
            ReportAssembler::assemble("nexus", SeverityLevel::Medium, &findings, &Allowlist::empty());
        assert_eq!(report.total_findings, 2);
        assert_eq!(report.evaluated_findings.len(), 1);
        assert_eq!(report.processing_errors.len(), 1);
        assert_eq!(report.processing_errors[0].finding.name, "broken");
        assert_eq!(report.failure_count, 1);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_failed_scan_report() {
        let scan = ScanFindings::failed("ScanNotFoundException: no scan for nexus:1");
        let report = ReportAssembler::from_scan(
            "nexus",
            None,
            SeverityLevel::Medium,
            &scan,
            &Allowlist::empty(),
        );
        assert_eq!(report.total_findings, 0);
        assert_eq!(
            report.scan_error.as_deref(),
            Some("ScanNotFoundException: no scan for nexus:1")
        );
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_failed_scan_blank_message() {
        let report = ReportAssembler::assemble_failed_scan("nexus", SeverityLevel::Low, "  ");
        assert_eq!(report.scan_error.as_deref(), Some("scan retrieval failed"));
    }

    #[test]
    fn test_from_scan_ignores_histogram_for_counting() {
        let findings = vec![finding("a", SeverityLevel::High, "openssl", "1.0.1")];
        let misleading = HashMap::from([("CRITICAL".to_string(), 7)]);
        let scan = ScanFindings::succeeded(findings, misleading);
        let allowlist = Allowlist::new(vec!["openssl".to_string()], HashMap::new());
        let image = ImageIdentity::new(None, "base/nexus".to_string(), "1".to_string()).unwrap();
        let report = ReportAssembler::from_scan(
            "nexus",
            Some(image),
            SeverityLevel::Low,
            &scan,
            &allowlist,
        );
        assert_eq!(report.failure_count, 0);
        assert_eq!(report.tag(), Some("1"));
    }
}
