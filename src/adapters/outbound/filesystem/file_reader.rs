use crate::ports::outbound::{AllowlistReader, CompositionReader};
use crate::scan_audit::domain::{Allowlist, Composition};
use crate::scan_audit::policies::ComponentNaming;
use crate::shared::error::AuditError;
use crate::shared::security::{validate_file_size, validate_regular_file, MAX_DOCUMENT_SIZE};
use crate::shared::Result;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// FileSystemReader adapter for reading YAML documents from the file system
///
/// This adapter implements both AllowlistReader and CompositionReader ports.
pub struct FileSystemReader;

impl FileSystemReader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FileSystemReader {
    /// Safely read a file with security checks:
    /// - Reject symbolic links
    /// - Check file size limits
    /// - Validate file is a regular file
    fn safe_read_file(&self, path: &Path, file_type: &str) -> Result<String> {
        let file_size = validate_regular_file(path, file_type)?;
        validate_file_size(file_size, path, MAX_DOCUMENT_SIZE)?;

        fs::read_to_string(path).map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file_type, e))
    }
}

impl AllowlistReader for FileSystemReader {
    fn read_allowlist(&self, path: Option<&Path>) -> Result<Allowlist> {
        let Some(path) = path else {
            return Ok(Allowlist::empty());
        };

        if !path.exists() {
            log::warn!(
                "Allowlist {} does not exist; continuing with an empty allowlist",
                path.display()
            );
            return Ok(Allowlist::empty());
        }

        let content = self
            .safe_read_file(path, "allowlist")
            .map_err(|e| AuditError::FileReadError {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        // An empty document is an empty allowlist
        if content.trim().is_empty() {
            return Ok(Allowlist::empty());
        }

        let allowlist: Allowlist =
            serde_yaml_ng::from_str(&content).map_err(|e| AuditError::DocumentParseError {
                document: "allowlist".to_string(),
                path: path.to_path_buf(),
                details: e.to_string(),
                hint: "Expected the keys 'global_allowlist' (a list) and 'container_allowlist' (a mapping of component to list)".to_string(),
            })?;

        if let Some(location) = allowlist.find_empty_pattern() {
            return Err(AuditError::DocumentParseError {
                document: "allowlist".to_string(),
                path: path.to_path_buf(),
                details: format!("empty pattern at {}", location),
                hint: "An empty pattern would allow every package; remove it".to_string(),
            }
            .into());
        }

        log::debug!(
            "Loaded allowlist {} with {} global pattern(s)",
            path.display(),
            allowlist.global_patterns.len()
        );
        Ok(allowlist)
    }
}

impl CompositionReader for FileSystemReader {
    fn read_composition(&self, path: &Path) -> Result<Composition> {
        let content = self
            .safe_read_file(path, "composition file")
            .map_err(|e| AuditError::FileReadError {
                path: path.to_path_buf(),
                details: e.to_string(),
            })?;

        let document: BTreeMap<String, String> =
            serde_yaml_ng::from_str(&content).map_err(|e| AuditError::DocumentParseError {
                document: "composition file".to_string(),
                path: path.to_path_buf(),
                details: e.to_string(),
                hint: "Expected a mapping of component keys to image tags; quote tags that look like numbers (e.g. \"1.10\")".to_string(),
            })?;

        if document.is_empty() {
            return Err(AuditError::DocumentParseError {
                document: "composition file".to_string(),
                path: path.to_path_buf(),
                details: "the composition lists no components".to_string(),
                hint: "Add at least one 'component_version: tag' entry".to_string(),
            }
            .into());
        }

        ComponentNaming::composition_from_document(document).map_err(|e| {
            AuditError::DocumentParseError {
                document: "composition file".to_string(),
                path: path.to_path_buf(),
                details: e.to_string(),
                hint: "Every key must name a distinct component and every tag must be non-empty"
                    .to_string(),
            }
            .into()
        })
    }
}
