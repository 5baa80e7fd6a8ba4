use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the CLI application.
///
/// These codes allow CI systems to distinguish between different
/// types of failures and successes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Success - every image was audited (individual scan failures are reported, not fatal)
    Success = 0,
    /// Findings at or above the cutoff were detected and `--fail-on-findings` is set
    FindingsDetected = 1,
    /// Invalid command-line arguments (clap parsing errors)
    InvalidArguments = 2,
    /// Application error (configuration error, registry session error, file I/O error, etc.)
    ApplicationError = 3,
    /// One or more images could not be scanned and `--fail-on-scan-error` is set
    ScanErrors = 4,
}

impl ExitCode {
    /// Convert to i32 for use with std::process::exit
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Success => write!(f, "Success (0)"),
            ExitCode::FindingsDetected => write!(f, "Findings Detected (1)"),
            ExitCode::InvalidArguments => write!(f, "Invalid Arguments (2)"),
            ExitCode::ApplicationError => write!(f, "Application Error (3)"),
            ExitCode::ScanErrors => write!(f, "Scan Errors (4)"),
        }
    }
}

/// Application-specific errors that terminate a run.
///
/// Per-image and per-finding problems never surface here; they are
/// recorded in the reports instead.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error("Failed to read file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the file exists and you have read permissions")]
    FileReadError { path: PathBuf, details: String },

    #[error("Failed to parse {document}: {path}\nDetails: {details}\n\n💡 Hint: {hint}")]
    DocumentParseError {
        document: String,
        path: PathBuf,
        details: String,
        hint: String,
    },

    #[error("Failed to write to file: {path}\nDetails: {details}\n\n💡 Hint: Please verify that the directory exists and you have write permissions")]
    FileWriteError { path: PathBuf, details: String },

    #[error("Invalid configuration: {message}\n\n💡 Hint: {hint}")]
    Configuration { message: String, hint: String },

    #[error("Scan results for {image} could not be retrieved\nDetails: {details}\n\n💡 Hint: Check that the image exists and that its scan has completed")]
    ScanFailed { image: String, details: String },

    #[error("Could not establish a registry session\nDetails: {0}\n\n💡 Hint: Check the endpoint, region and credentials")]
    RegistrySession(#[source] RegistryError),

    #[error("Security violation: {path}\nReason: {reason}\n\n💡 Hint: {hint}")]
    SecurityError {
        path: PathBuf,
        reason: String,
        hint: String,
    },
}

/// Errors reported by a registry/scanner backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("registry server error: {0}")]
    ServerError(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("scan not found: {0}")]
    ScanNotFound(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("malformed registry response: {0}")]
    MalformedResponse(String),
}

impl RegistryError {
    /// Returns true when the error means no registry session can be used at all.
    ///
    /// Such errors abort a batch; every other variant is scoped to one image.
    pub fn is_session_failure(&self) -> bool {
        matches!(
            self,
            RegistryError::Authentication(_) | RegistryError::Transport(_)
        )
    }
}
