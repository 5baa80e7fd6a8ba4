//! Configuration file support for ecr-scan-audit.
//!
//! Provides YAML-based configuration through `ecr-scan-audit.config.yml`
//! files, including data structures, file loading, and validation.

use anyhow::{bail, Context};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::application::dto::ReportFormat;
use crate::scan_audit::domain::SeverityLevel;
use crate::shared::Result;

pub const CONFIG_FILENAME: &str = "ecr-scan-audit.config.yml";

/// Top-level configuration file schema.
#[derive(Debug, Deserialize, Default)]
pub struct ConfigFile {
    pub cutoff: Option<String>,
    pub base_repo: Option<String>,
    pub registry_id: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub allowlist: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub format: Option<String>,
    pub latest_filter: Option<String>,
    pub concurrency: Option<usize>,
    pub fail_on_findings: Option<bool>,
    pub fail_on_scan_error: Option<bool>,
    /// Captures unknown fields for warnings.
    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_yaml_ng::Value>,
}

impl ConfigFile {
    /// Parsed cutoff, if configured
    pub fn cutoff_level(&self) -> Result<Option<SeverityLevel>> {
        self.cutoff
            .as_deref()
            .map(|c| c.parse::<SeverityLevel>().map_err(anyhow::Error::msg))
            .transpose()
    }

    /// Parsed report format, if configured
    pub fn report_format(&self) -> Result<Option<ReportFormat>> {
        self.format
            .as_deref()
            .map(|f| f.parse::<ReportFormat>().map_err(anyhow::Error::msg))
            .transpose()
    }
}

/// Load config from an explicit path. Returns an error if the file is not found.
pub fn load_config_from_path(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Failed to read config file: {}\n\n💡 Hint: Check that the file exists and is readable.",
            path.display()
        )
    })?;

    // An empty file is an empty configuration
    if content.trim().is_empty() {
        return Ok(ConfigFile::default());
    }

    let config: ConfigFile = serde_yaml_ng::from_str(&content).with_context(|| {
        format!(
            "Failed to parse config file: {}\n\n💡 Hint: Ensure the file contains valid YAML syntax.",
            path.display()
        )
    })?;

    validate_config(&config)?;
    warn_unknown_fields(&config);

    Ok(config)
}

/// Auto-discover config in a directory. Returns `None` silently if not found.
pub fn discover_config(dir: &Path) -> Result<Option<ConfigFile>> {
    let config_path = dir.join(CONFIG_FILENAME);

    if !config_path.exists() {
        return Ok(None);
    }

    log::debug!("Using config file {}", config_path.display());
    let config = load_config_from_path(&config_path)?;
    Ok(Some(config))
}

/// Validate the loaded configuration.
fn validate_config(config: &ConfigFile) -> Result<()> {
    if let Err(e) = config.cutoff_level() {
        bail!(
            "Invalid config: cutoff: {}\n\n💡 Hint: Use one of INFORMATIONAL, LOW, MEDIUM, HIGH, CRITICAL.",
            e
        );
    }
    if let Err(e) = config.report_format() {
        bail!(
            "Invalid config: format: {}\n\n💡 Hint: Supported formats are 'junit' and 'json'.",
            e
        );
    }
    if config.concurrency == Some(0) {
        bail!(
            "Invalid config: concurrency must be at least 1.\n\n\
             💡 Hint: Remove the key to use the default of 8 concurrent images."
        );
    }
    if let Some(ref region) = config.region {
        if region.trim().is_empty() {
            bail!(
                "Invalid config: region must not be empty.\n\n\
                 💡 Hint: Use an AWS region name such as \"eu-west-1\"."
            );
        }
    }
    Ok(())
}

/// Warn about unknown fields in the config file.
fn warn_unknown_fields(config: &ConfigFile) {
    let mut keys: Vec<_> = config.unknown_fields.keys().collect();
    keys.sort();
    for key in keys {
        eprintln!(
            "⚠️  Warning: Unknown config field '{}' will be ignored.",
            key
        );
    }
}
