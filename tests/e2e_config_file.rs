/// End-to-end tests for config file loading and CLI option merging.
///
/// These tests exercise the full flow from config file on disk through CLI invocation
/// to the written reports, using `assert_cmd` and `tempfile` for isolated test environments.
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

/// Write a config file at the specified path.
fn write_config(path: &Path, content: &str) {
    fs::write(path, content).unwrap();
}

/// Config pointing at the fixture snapshot and allowlist
fn base_config(extra: &str) -> String {
    format!(
        "base_repo: base\nallowlist: {}\n{}",
        fixtures_path().join("allowlist.yml").display(),
        extra
    )
}

fn snapshot_cmd(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("ecr-scan-audit");
    cmd.current_dir(dir.path())
        .arg("--snapshot-dir")
        .arg(fixtures_path().join("snapshot"));
    cmd
}

fn nexus_args() -> [&'static str; 4] {
    ["--container", "nexus", "--tag", "2.14.12"]
}

// ============================================================================
// Config File Auto-Discovery Tests
// ============================================================================

mod auto_discovery_tests {
    use super::*;

    #[test]
    fn test_auto_discovery_applies_settings() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("ecr-scan-audit.config.yml"),
            &base_config("cutoff: CRITICAL\noutput_dir: out\nformat: json\n"),
        );

        snapshot_cmd(&dir).args(nexus_args()).assert().code(0);

        let report = fs::read_to_string(dir.path().join("out/nexus/report.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&report).unwrap();
        assert_eq!(json["cutoff"], "CRITICAL");
        assert_eq!(json["failures"], 1);
    }

    #[test]
    fn test_no_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        snapshot_cmd(&dir)
            .args(nexus_args())
            .args(["--base-repo", "base"])
            .assert()
            .code(0);

        let xml = fs::read_to_string(dir.path().join("reports/nexus/report.xml")).unwrap();
        assert!(xml.contains(r#"<property name="cutoff" value="MEDIUM"/>"#));
        assert!(xml.contains(r#"failures="2""#));
    }

    #[test]
    fn test_config_fail_on_findings() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("ecr-scan-audit.config.yml"),
            &base_config("fail_on_findings: true\n"),
        );

        snapshot_cmd(&dir).args(nexus_args()).assert().code(1);
    }
}

// ============================================================================
// Explicit Config Path Tests
// ============================================================================

mod explicit_config_tests {
    use super::*;

    #[test]
    fn test_explicit_config_path() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("custom.yml");
        write_config(&config_path, &base_config("output_dir: custom-out\n"));

        snapshot_cmd(&dir)
            .args(nexus_args())
            .arg("--config")
            .arg(&config_path)
            .assert()
            .code(0);

        assert!(dir.path().join("custom-out/nexus/report.xml").exists());
    }

    #[test]
    fn test_explicit_config_missing_file() {
        let dir = TempDir::new().unwrap();
        snapshot_cmd(&dir)
            .args(nexus_args())
            .args(["--config", "missing.yml"])
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_config_value() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("bad.yml");
        write_config(&config_path, "cutoff: SEVERE\n");

        snapshot_cmd(&dir)
            .args(nexus_args())
            .arg("--config")
            .arg(&config_path)
            .assert()
            .code(3)
            .stderr(predicate::str::contains("Invalid config: cutoff"));
    }

    #[test]
    fn test_unknown_config_field_warns() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("ecr-scan-audit.config.yml"),
            &base_config("check_cve: true\n"),
        );

        snapshot_cmd(&dir)
            .args(nexus_args())
            .assert()
            .code(0)
            .stderr(predicate::str::contains(
                "Unknown config field 'check_cve' will be ignored",
            ));
    }
}

// ============================================================================
// CLI Override Tests
// ============================================================================

mod cli_override_tests {
    use super::*;

    #[test]
    fn test_cli_cutoff_overrides_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("ecr-scan-audit.config.yml"),
            &base_config("cutoff: LOW\n"),
        );

        snapshot_cmd(&dir)
            .args(nexus_args())
            .args(["--cutoff", "CRITICAL"])
            .assert()
            .code(0);

        let xml = fs::read_to_string(dir.path().join("reports/nexus/report.xml")).unwrap();
        assert!(xml.contains(r#"<property name="cutoff" value="CRITICAL"/>"#));
    }

    #[test]
    fn test_env_overrides_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("ecr-scan-audit.config.yml"),
            &base_config("cutoff: LOW\n"),
        );

        snapshot_cmd(&dir)
            .env("ESA_SEVERITY_CUTOFF", "HIGH")
            .args(nexus_args())
            .assert()
            .code(0);

        let xml = fs::read_to_string(dir.path().join("reports/nexus/report.xml")).unwrap();
        assert!(xml.contains(r#"<property name="cutoff" value="HIGH"/>"#));
    }

    #[test]
    fn test_cli_format_overrides_config() {
        let dir = TempDir::new().unwrap();
        write_config(
            &dir.path().join("ecr-scan-audit.config.yml"),
            &base_config("format: json\n"),
        );

        snapshot_cmd(&dir)
            .args(nexus_args())
            .args(["--format", "junit"])
            .assert()
            .code(0);

        assert!(dir.path().join("reports/nexus/report.xml").exists());
        assert!(!dir.path().join("reports/nexus/report.json").exists());
    }
}
