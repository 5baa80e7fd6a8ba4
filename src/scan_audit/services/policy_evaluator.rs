use crate::scan_audit::domain::{
    AllowlistIndex, EvaluatedFinding, Finding, FindingError, FindingSeverity, SeverityLevel,
    Verdict, PACKAGE_NAME_ATTRIBUTE, PACKAGE_VERSION_ATTRIBUTE,
};

/// Placeholder used in failure messages when the scanner gave no description
const MISSING_DESCRIPTION: &str = "no description provided";

/// PolicyEvaluator - Classifies one finding against the cutoff and allowlist
///
/// Evaluation order:
/// 1. Extract `package_name` / `package_version` (missing or empty is an error)
/// 2. Allowlist prefix match on `"<name>@<version>"` passes the finding
/// 3. Otherwise the finding fails when its severity is at or above the cutoff
///
/// Findings with an unrecognized severity are never failed here; the
/// assembler counts them as errors instead.
pub struct PolicyEvaluator;

impl PolicyEvaluator {
    /// Evaluates a single finding
    ///
    /// # Arguments
    /// * `finding` - Raw finding from the scanner
    /// * `cutoff` - Minimum severity counted as a failure
    /// * `allowlist` - Flattened allowlist for the finding's component
    ///
    /// # Errors
    /// `FindingError::MissingAttribute` when a package attribute is absent or empty
    pub fn evaluate(
        finding: &Finding,
        cutoff: SeverityLevel,
        allowlist: &AllowlistIndex,
    ) -> Result<EvaluatedFinding, FindingError> {
        let package_name = Self::required_attribute(finding, PACKAGE_NAME_ATTRIBUTE)?;
        let package_version = Self::required_attribute(finding, PACKAGE_VERSION_ATTRIBUTE)?;
        let package_key = format!("{}@{}", package_name, package_version);

        if let Some(pattern) = allowlist.first_match(&package_key) {
            let reason = format!(
                "Vulnerability {} with severity {} in {} is allowlisted by pattern '{}' (cutoff {}). PASSED!",
                finding.name, finding.severity, package_key, pattern, cutoff
            );
            return Ok(EvaluatedFinding {
                finding: finding.clone(),
                verdict: Verdict::Passed,
                reason,
                matched_allowlist_pattern: Some(pattern.to_string()),
                package_key,
            });
        }

        let (verdict, reason) = match &finding.severity {
            FindingSeverity::Known(level) if level.meets_cutoff(cutoff) => (
                Verdict::Failed,
                format!(
                    "Vulnerability {} of severity {} at or above cutoff {}. FAILED! Description: {}",
                    finding.name,
                    level,
                    cutoff,
                    finding
                        .description
                        .as_deref()
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or(MISSING_DESCRIPTION)
                ),
            ),
            FindingSeverity::Known(level) => (
                Verdict::Passed,
                format!(
                    "Vulnerability {} with severity {} below cutoff {}. PASSED!",
                    finding.name, level, cutoff
                ),
            ),
            FindingSeverity::Undefined(_) => (
                Verdict::Passed,
                format!(
                    "Vulnerability {} has unrecognized severity {} and cannot be compared with cutoff {}. Reported as error.",
                    finding.name, finding.severity, cutoff
                ),
            ),
        };

        Ok(EvaluatedFinding {
            finding: finding.clone(),
            verdict,
            reason,
            matched_allowlist_pattern: None,
            package_key,
        })
    }

    fn required_attribute<'a>(finding: &'a Finding, key: &str) -> Result<&'a str, FindingError> {
        finding
            .attribute(key)
            .ok_or_else(|| FindingError::MissingAttribute {
                finding: finding.name.clone(),
                attribute: key.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openssl_finding(severity: SeverityLevel) -> Finding {
        Finding::new("CVE-2014-0160", severity.into())
            .with_package("openssl", "1.0.1")
            .with_description("Heartbleed")
    }

    fn no_allowlist() -> AllowlistIndex {
        AllowlistIndex::from_patterns(vec![])
    }

    #[test]
    fn test_high_finding_fails_at_medium_cutoff() {
        let evaluated = PolicyEvaluator::evaluate(
            &openssl_finding(SeverityLevel::High),
            SeverityLevel::Medium,
            &no_allowlist(),
        )
        .unwrap();
        assert_eq!(evaluated.verdict, Verdict::Failed);
        assert_eq!(evaluated.package_key, "openssl@1.0.1");
        assert!(evaluated.reason.contains("CVE-2014-0160"));
        assert!(evaluated.reason.contains("HIGH"));
        assert!(evaluated.reason.contains("MEDIUM"));
        assert!(evaluated.reason.contains("Heartbleed"));
    }

    #[test]
    fn test_allowlisted_finding_passes() {
        let allowlist = AllowlistIndex::from_patterns(vec!["openssl@1.0.1".to_string()]);
        let evaluated = PolicyEvaluator::evaluate(
            &openssl_finding(SeverityLevel::High),
            SeverityLevel::Medium,
            &allowlist,
        )
        .unwrap();
        assert_eq!(evaluated.verdict, Verdict::Passed);
        assert_eq!(
            evaluated.matched_allowlist_pattern.as_deref(),
            Some("openssl@1.0.1")
        );
        assert!(evaluated.reason.contains("openssl@1.0.1"));
    }

    #[test]
    fn test_allowlist_overrides_every_severity() {
        let allowlist = AllowlistIndex::from_patterns(vec!["openssl".to_string()]);
        for severity in SeverityLevel::ALL {
            let evaluated = PolicyEvaluator::evaluate(
                &openssl_finding(severity),
                SeverityLevel::Informational,
                &allowlist,
            )
            .unwrap();
            assert_eq!(evaluated.verdict, Verdict::Passed, "{}", severity);
        }
    }

    #[test]
    fn test_first_matching_pattern_is_reported() {
        let allowlist =
            AllowlistIndex::from_patterns(vec!["openssl@1".to_string(), "openssl".to_string()]);
        let evaluated = PolicyEvaluator::evaluate(
            &openssl_finding(SeverityLevel::Critical),
            SeverityLevel::Low,
            &allowlist,
        )
        .unwrap();
        assert_eq!(evaluated.matched_allowlist_pattern.as_deref(), Some("openssl@1"));
    }

    #[test]
    fn test_cutoff_boundary_is_inclusive() {
        let evaluated = PolicyEvaluator::evaluate(
            &openssl_finding(SeverityLevel::Critical),
            SeverityLevel::Critical,
            &no_allowlist(),
        )
        .unwrap();
        assert_eq!(evaluated.verdict, Verdict::Failed);
    }

    #[test]
    fn test_below_cutoff_passes() {
        let evaluated = PolicyEvaluator::evaluate(
            &openssl_finding(SeverityLevel::Low),
            SeverityLevel::Medium,
            &no_allowlist(),
        )
        .unwrap();
        assert_eq!(evaluated.verdict, Verdict::Passed);
        assert!(evaluated.reason.contains("below cutoff MEDIUM"));
        assert_eq!(evaluated.matched_allowlist_pattern, None);
    }

    #[test]
    fn test_missing_description_placeholder() {
        let finding =
            Finding::new("CVE-2021-1", SeverityLevel::High.into()).with_package("bash", "5.0");
        let evaluated =
            PolicyEvaluator::evaluate(&finding, SeverityLevel::Low, &no_allowlist()).unwrap();
        assert!(evaluated.reason.ends_with("Description: no description provided"));
    }

    #[test]
    fn test_missing_package_version() {
        let finding = Finding::new("CVE-2021-2", SeverityLevel::High.into())
            .with_attribute(PACKAGE_NAME_ATTRIBUTE, "bash");
        let error =
            PolicyEvaluator::evaluate(&finding, SeverityLevel::Low, &no_allowlist()).unwrap_err();
        assert_eq!(
            error,
            FindingError::MissingAttribute {
                finding: "CVE-2021-2".to_string(),
                attribute: PACKAGE_VERSION_ATTRIBUTE.to_string(),
            }
        );
    }

    #[test]
    fn test_empty_package_name_is_missing() {
        let finding = Finding::new("CVE-2021-3", SeverityLevel::High.into()).with_package("", "1");
        let error =
            PolicyEvaluator::evaluate(&finding, SeverityLevel::Low, &no_allowlist()).unwrap_err();
        assert!(matches!(
            error,
            FindingError::MissingAttribute { ref attribute, .. } if attribute == PACKAGE_NAME_ATTRIBUTE
        ));
    }

    #[test]
    fn test_undefined_severity_never_fails() {
        let finding = Finding::new("CVE-2022-9", FindingSeverity::parse("UNDEFINED"))
            .with_package("zlib", "1.2");
        let evaluated =
            PolicyEvaluator::evaluate(&finding, SeverityLevel::Informational, &no_allowlist())
                .unwrap();
        assert_eq!(evaluated.verdict, Verdict::Passed);
        assert!(evaluated.reason.contains("unrecognized severity UNDEFINED"));
    }

    #[test]
    fn test_verdict_monotonic_in_cutoff() {
        for severity in SeverityLevel::ALL {
            let finding = openssl_finding(severity);
            let mut failed_before = true;
            for cutoff in SeverityLevel::ALL {
                let failed = PolicyEvaluator::evaluate(&finding, cutoff, &no_allowlist())
                    .unwrap()
                    .is_failed();
                // Raising the cutoff may only turn failures into passes
                assert!(failed_before || !failed);
                failed_before = failed;
            }
        }
    }
}
