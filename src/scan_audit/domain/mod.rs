pub mod allowlist;
pub mod composition;
pub mod evaluation;
pub mod finding;
pub mod image;
pub mod image_report;
pub mod severity;

pub use allowlist::{Allowlist, AllowlistIndex};
pub use composition::{Composition, CompositionEntry};
pub use evaluation::{EvaluatedFinding, FindingError, FindingProcessingError, Verdict};
pub use finding::{
    Finding, ScanFindings, ScanStatus, PACKAGE_NAME_ATTRIBUTE, PACKAGE_VERSION_ATTRIBUTE,
};
pub use image::{ComponentName, ImageDetail, ImageIdentifier, ImageIdentity, RepositoryRef};
pub use image_report::ImageReport;
pub use severity::{FindingSeverity, SeverityLevel};
