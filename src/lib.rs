//! ecr-scan-audit - vulnerability-scan gate for container images
//!
//! This library turns the scan findings of images held in Amazon ECR (or an
//! offline snapshot of a registry) into one pass/fail report per image,
//! following hexagonal architecture and Domain-Driven Design principles.
//!
//! # Architecture
//!
//! The library is organized into the following layers:
//!
//! - **Domain Layer** (`scan_audit`): Severity order, allowlists, finding evaluation, report assembly
//! - **Application Layer** (`application`): Use cases and application services
//! - **Ports** (`ports`): Interface definitions for infrastructure
//! - **Adapters** (`adapters`): Concrete implementations of ports
//! - **Shared** (`shared`): Common utilities and error types
//!
//! # Example
//!
//! ```no_run
//! use ecr_scan_audit::prelude::*;
//! use std::path::PathBuf;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! // Create adapters
//! let registry = SnapshotRegistry::new(PathBuf::from("snapshot"));
//! let progress_reporter = StderrProgressReporter::new();
//!
//! // Create use case
//! let use_case = AuditImagesUseCase::new(
//!     registry,
//!     FileSystemReader::new(),
//!     FileSystemReader::new(),
//!     progress_reporter,
//! );
//!
//! // Execute
//! let request = AuditRequest::new(AuditTarget::AllRepositories, SeverityLevel::High)
//!     .with_base_repo("zorgdomein");
//! let response = use_case.execute(request).await?;
//!
//! // Format output
//! let formatter = JunitFormatter::new();
//! for report in &response.reports {
//!     println!("{}", formatter.format(report)?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod application;
pub mod config;
pub mod ports;
pub mod scan_audit;
pub mod shared;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adapters::outbound::console::StderrProgressReporter;
    pub use crate::adapters::outbound::filesystem::{
        FileSystemReader, ReportDirectoryWriter, SnapshotRegistry,
    };
    pub use crate::adapters::outbound::formatters::{JsonFormatter, JunitFormatter};
    pub use crate::adapters::outbound::network::{EcrClientConfig, EcrRegistryClient};
    pub use crate::application::dto::{
        AuditRequest, AuditResponse, AuditTarget, ReportFormat, TagSelection,
    };
    pub use crate::application::use_cases::{
        AuditImagesUseCase, LatestTagResolver, ScanResultAggregator,
    };
    pub use crate::ports::outbound::{
        AllowlistReader, CompositionReader, ProgressReporter, RegistryClient, ReportFormatter,
        ReportWriter,
    };
    pub use crate::scan_audit::domain::{
        Allowlist, AllowlistIndex, ComponentName, Composition, EvaluatedFinding, Finding,
        FindingSeverity, ImageIdentity, ImageReport, RepositoryRef, ScanFindings, SeverityLevel,
        Verdict,
    };
    pub use crate::scan_audit::policies::ComponentNaming;
    pub use crate::scan_audit::services::{
        PolicyEvaluator, ReportAssembler, ResolutionError, TagSelector,
    };
    pub use crate::shared::Result;
}
