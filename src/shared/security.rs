use crate::shared::Result;
use std::fs;
use std::path::{Component, Path};

/// Maximum size of an input document (10 MB)
/// Allowlists and compositions are small; anything larger is rejected
pub const MAX_DOCUMENT_SIZE: u64 = 10 * 1024 * 1024;

/// Maximum size of a snapshot registry export (100 MB)
pub const MAX_SNAPSHOT_SIZE: u64 = 100 * 1024 * 1024;

/// Validates that a path is not a symbolic link
///
/// Uses `symlink_metadata()` so the link itself is inspected, not its target.
///
/// # Arguments
/// * `path` - The path to validate
/// * `operation` - Description of the operation (e.g., "read", "write") for error messages
pub fn validate_not_symlink(path: &Path, operation: &str) -> Result<()> {
    let metadata = fs::symlink_metadata(path).map_err(|e| {
        anyhow::anyhow!(
            "Failed to read metadata for {} operation on {}: {}",
            operation,
            path.display(),
            e
        )
    })?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, {} operations on symbolic links are not allowed.",
            path.display(),
            operation
        );
    }

    Ok(())
}

/// Validates that a path exists and is a regular file (not a directory or symlink)
///
/// # Arguments
/// * `path` - The path to validate
/// * `file_description` - Description of the file (e.g., "allowlist", "composition file")
///
/// # Errors
/// Returns an error if:
/// - The path doesn't exist
/// - The path is a symbolic link
/// - The path is not a regular file
pub fn validate_regular_file(path: &Path, file_description: &str) -> Result<u64> {
    let metadata = fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {} metadata: {}", file_description, e))?;

    if metadata.is_symlink() {
        anyhow::bail!(
            "Security: {} is a symbolic link. For security reasons, symbolic links are not allowed.",
            path.display()
        );
    }

    if !metadata.is_file() {
        anyhow::bail!("{} is not a regular file", path.display());
    }

    Ok(metadata.len())
}

/// Validates file size is within acceptable limits
pub fn validate_file_size(file_size: u64, path: &Path, max_size: u64) -> Result<()> {
    if file_size > max_size {
        anyhow::bail!(
            "Security: {} is too large ({} bytes). Maximum allowed size is {} bytes.",
            path.display(),
            file_size,
            max_size
        );
    }
    Ok(())
}

/// Validates a component name before it becomes a directory path under the report root
///
/// Component names come from registry listings and composition keys. Nested
/// names such as `tools/jq` are allowed; absolute paths, `.` and `..` are not.
pub fn validate_relative_path(relative: &str) -> Result<()> {
    if relative.is_empty() {
        anyhow::bail!("Security: empty path is not allowed");
    }

    let path = Path::new(relative);
    let all_normal = path
        .components()
        .all(|component| matches!(component, Component::Normal(_)));
    if !all_normal || path.components().next().is_none() {
        anyhow::bail!(
            "Security: '{}' must be a relative path without '.' or '..' segments",
            relative
        );
    }
    Ok(())
}
