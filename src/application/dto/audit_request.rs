use crate::scan_audit::domain::SeverityLevel;
use std::path::PathBuf;

/// How the tag of a single image is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagSelection {
    /// Audit exactly this tag
    Fixed(String),
    /// Audit the most recently pushed tag
    Latest,
}

/// Which images a run audits
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditTarget {
    /// One component of the base repository
    Image { container: String, tag: TagSelection },
    /// Every component listed in a composition document
    Composition { path: PathBuf },
    /// The latest tag of every repository under the base repository
    AllRepositories,
}

/// AuditRequest - Internal request DTO for the audit use case
///
/// Built once at startup from CLI flags, environment and config file, and
/// never mutated afterwards.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub target: AuditTarget,
    /// Minimum severity counted as a failure
    pub cutoff: SeverityLevel,
    /// Common repository prefix; empty for none
    pub base_repo: String,
    pub registry_id: Option<String>,
    pub allowlist_path: Option<PathBuf>,
    /// Tags containing this substring are skipped by latest-tag resolution
    pub latest_filter: Option<String>,
    /// Maximum number of images fetched at the same time
    pub concurrency: usize,
}

impl AuditRequest {
    pub fn new(target: AuditTarget, cutoff: SeverityLevel) -> Self {
        Self {
            target,
            cutoff,
            base_repo: String::new(),
            registry_id: None,
            allowlist_path: None,
            latest_filter: None,
            concurrency: 8,
        }
    }

    pub fn with_base_repo(mut self, base_repo: impl Into<String>) -> Self {
        self.base_repo = base_repo.into();
        self
    }

    pub fn with_registry_id(mut self, registry_id: Option<String>) -> Self {
        self.registry_id = registry_id.filter(|id| !id.is_empty());
        self
    }

    pub fn with_allowlist_path(mut self, path: Option<PathBuf>) -> Self {
        self.allowlist_path = path;
        self
    }

    pub fn with_latest_filter(mut self, filter: Option<String>) -> Self {
        self.latest_filter = filter.filter(|f| !f.is_empty());
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Returns true for composition and all-repositories runs
    pub fn is_batch(&self) -> bool {
        !matches!(self.target, AuditTarget::Image { .. })
    }
}
