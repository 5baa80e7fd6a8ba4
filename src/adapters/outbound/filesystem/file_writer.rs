use crate::ports::outbound::ReportWriter;
use crate::shared::error::AuditError;
use crate::shared::security::{validate_not_symlink, validate_relative_path};
use crate::shared::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// ReportDirectoryWriter adapter writing one report per component
///
/// Reports land at `<output_dir>/<component>/<file_name>`. Missing
/// directories are created; existing symbolic links are never written through.
pub struct ReportDirectoryWriter {
    output_dir: PathBuf,
}

impl ReportDirectoryWriter {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Rejects symbolic links anywhere between the output root and `target`
    fn validate_no_symlinks(&self, target: &Path) -> Result<()> {
        let mut current = self.output_dir.clone();
        let relative = target.strip_prefix(&self.output_dir).unwrap_or(target);
        let mut candidates = vec![current.clone()];
        for component in relative.components() {
            current.push(component);
            candidates.push(current.clone());
        }

        for candidate in candidates {
            if fs::symlink_metadata(&candidate).is_ok() {
                validate_not_symlink(&candidate, "write")?;
            }
        }
        Ok(())
    }
}

impl ReportWriter for ReportDirectoryWriter {
    fn write_report(&self, component: &str, file_name: &str, content: &str) -> Result<PathBuf> {
        validate_relative_path(component)?;
        validate_relative_path(file_name)?;

        let directory = self.output_dir.join(component);
        let path = directory.join(file_name);

        self.validate_no_symlinks(&path)
            .map_err(|e| AuditError::SecurityError {
                path: path.clone(),
                reason: e.to_string(),
                hint: "Remove the symbolic link or choose another --output-dir".to_string(),
            })?;

        fs::create_dir_all(&directory).map_err(|e| AuditError::FileWriteError {
            path: directory.clone(),
            details: e.to_string(),
        })?;

        fs::write(&path, content).map_err(|e| AuditError::FileWriteError {
            path: path.clone(),
            details: e.to_string(),
        })?;

        log::debug!("Wrote {} bytes to {}", content.len(), path.display());
        Ok(path)
    }
}
