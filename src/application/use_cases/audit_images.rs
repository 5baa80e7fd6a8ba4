use super::aggregate_scan_results::{BatchTarget, ScanResultAggregator};
use super::resolve_latest_tag::LatestTagResolver;
use crate::application::dto::{AuditRequest, AuditResponse, AuditTarget, TagSelection};
use crate::ports::outbound::{AllowlistReader, CompositionReader, ProgressReporter, RegistryClient};
use crate::scan_audit::domain::{Allowlist, ComponentName, ImageReport, RepositoryRef};
use crate::scan_audit::policies::ComponentNaming;
use crate::scan_audit::services::{ReportAssembler, ResolutionError};
use crate::shared::error::{AuditError, RegistryError};
use crate::shared::Result;
use std::path::Path;

/// AuditImagesUseCase - Core use case for auditing image scan results
///
/// This use case orchestrates one audit run using generic dependency
/// injection for all infrastructure dependencies:
/// 1. Load the allowlist
/// 2. Determine the images (single, composition or all repositories)
/// 3. Resolve tags and fetch scan findings
/// 4. Assemble one `ImageReport` per image
///
/// # Type Parameters
/// * `R` - RegistryClient implementation
/// * `AR` - AllowlistReader implementation
/// * `CR` - CompositionReader implementation
/// * `PR` - ProgressReporter implementation
pub struct AuditImagesUseCase<R, AR, CR, PR> {
    registry: R,
    allowlist_reader: AR,
    composition_reader: CR,
    progress_reporter: PR,
}

impl<R, AR, CR, PR> AuditImagesUseCase<R, AR, CR, PR>
where
    R: RegistryClient,
    AR: AllowlistReader,
    CR: CompositionReader,
    PR: ProgressReporter,
{
    /// Creates a new AuditImagesUseCase with injected dependencies
    pub fn new(registry: R, allowlist_reader: AR, composition_reader: CR, progress_reporter: PR) -> Self {
        Self {
            registry,
            allowlist_reader,
            composition_reader,
            progress_reporter,
        }
    }

    /// Executes the audit
    ///
    /// # Errors
    /// - Configuration errors (unreadable allowlist or composition)
    /// - In single-image mode, any failure to obtain the image's scan results
    /// - In batch mode, only registry session failures
    pub async fn execute(&self, request: AuditRequest) -> Result<AuditResponse> {
        let allowlist = self.load_allowlist(&request)?;

        let reports = match &request.target {
            AuditTarget::Image { container, tag } => {
                vec![self.audit_single(&request, container, tag, &allowlist).await?]
            }
            AuditTarget::Composition { path } => {
                let targets = self.composition_targets(&request, path)?;
                self.audit_batch(&request, targets, &allowlist).await?
            }
            AuditTarget::AllRepositories => {
                let targets = self.repository_targets(&request).await?;
                self.audit_batch(&request, targets, &allowlist).await?
            }
        };

        let response = AuditResponse::new(reports);
        self.progress_reporter.report_summary(&response.reports);
        self.progress_reporter.report_completion(&format!(
            "✅ Audited {} image(s): {} finding(s) at or above {}, {} scan error(s)",
            response.reports.len(),
            response.total_failures(),
            request.cutoff,
            response.scan_error_count()
        ));
        Ok(response)
    }

    fn load_allowlist(&self, request: &AuditRequest) -> Result<Allowlist> {
        let allowlist = self
            .allowlist_reader
            .read_allowlist(request.allowlist_path.as_deref())?;
        if !allowlist.is_empty() {
            self.progress_reporter.report(&format!(
                "📋 Loaded allowlist: {} global pattern(s), {} component section(s)",
                allowlist.global_patterns.len(),
                allowlist.component_patterns.len()
            ));
        }
        Ok(allowlist)
    }

    async fn audit_single(
        &self,
        request: &AuditRequest,
        container: &str,
        selection: &TagSelection,
        allowlist: &Allowlist,
    ) -> Result<ImageReport> {
        let repository = RepositoryRef::new(
            request.registry_id.clone(),
            ComponentNaming::repository_for_component(&request.base_repo, container),
        );

        let tag = match selection {
            TagSelection::Fixed(tag) => tag.clone(),
            TagSelection::Latest => {
                self.progress_reporter.report(&format!(
                    "🔎 Resolving latest tag of {}...",
                    repository.repository_name()
                ));
                LatestTagResolver::new(&self.registry)
                    .resolve(&repository, request.latest_filter.as_deref())
                    .await
                    .map_err(|e| match e {
                        ResolutionError::Registry(error) => {
                            Self::single_image_error(repository.repository_name(), error)
                        }
                        other => AuditError::ScanFailed {
                            image: repository.repository_name().to_string(),
                            details: other.to_string(),
                        }
                        .into(),
                    })?
            }
        };

        let image = repository.with_tag(tag)?;
        self.progress_reporter
            .report(&format!("📥 Fetching scan findings for {}...", image));

        let aggregator = ScanResultAggregator::new(&self.registry, None);
        let scan = aggregator
            .get_findings(&image)
            .await
            .map_err(|e| Self::single_image_error(&image.to_string(), e))?;

        if scan.is_failed() {
            return Err(AuditError::ScanFailed {
                image: image.to_string(),
                details: scan.status_description.unwrap_or_default(),
            }
            .into());
        }

        Ok(ReportAssembler::from_scan(
            container,
            Some(image),
            request.cutoff,
            &scan,
            allowlist,
        ))
    }

    fn single_image_error(image: &str, error: RegistryError) -> anyhow::Error {
        if error.is_session_failure() {
            AuditError::RegistrySession(error).into()
        } else {
            AuditError::ScanFailed {
                image: image.to_string(),
                details: error.to_string(),
            }
            .into()
        }
    }

    fn composition_targets(&self, request: &AuditRequest, path: &Path) -> Result<Vec<BatchTarget>> {
        self.progress_reporter
            .report(&format!("📖 Loading composition from: {}", path.display()));
        let composition = self.composition_reader.read_composition(path)?;
        self.progress_reporter.report(&format!(
            "✅ Composition lists {} component(s)",
            composition.len()
        ));

        Ok(composition
            .entries()
            .iter()
            .map(|entry| BatchTarget {
                repository: RepositoryRef::new(
                    request.registry_id.clone(),
                    ComponentNaming::repository_for_component(
                        &request.base_repo,
                        entry.component.as_str(),
                    ),
                ),
                component: entry.component.clone(),
                tag: TagSelection::Fixed(entry.tag.clone()),
            })
            .collect())
    }

    async fn repository_targets(&self, request: &AuditRequest) -> Result<Vec<BatchTarget>> {
        self.progress_reporter.report("📚 Listing repositories...");
        let repositories = self
            .registry
            .list_repositories(request.registry_id.as_deref())
            .await
            .map_err(AuditError::RegistrySession)?;

        let mut targets = Vec::new();
        for repository in repositories {
            let Some(component) = ComponentNaming::component_from_repository(
                repository.repository_name(),
                &request.base_repo,
            ) else {
                continue;
            };
            targets.push(BatchTarget {
                component: ComponentName::new(component)?,
                repository: RepositoryRef::new(
                    request.registry_id.clone(),
                    repository.repository_name(),
                ),
                tag: TagSelection::Latest,
            });
        }

        self.progress_reporter.report(&format!(
            "✅ Found {} repositor{} under '{}'",
            targets.len(),
            if targets.len() == 1 { "y" } else { "ies" },
            request.base_repo
        ));
        Ok(targets)
    }

    async fn audit_batch(
        &self,
        request: &AuditRequest,
        targets: Vec<BatchTarget>,
        allowlist: &Allowlist,
    ) -> Result<Vec<ImageReport>> {
        if targets.is_empty() {
            self.progress_reporter
                .report_error("⚠️  Warning: No images to audit.");
            return Ok(Vec::new());
        }

        self.progress_reporter.report(&format!(
            "📥 Fetching scan findings for {} image(s)...",
            targets.len()
        ));

        let aggregator = ScanResultAggregator::new(&self.registry, request.latest_filter.clone());
        let results = aggregator
            .get_findings_batch(targets, request.concurrency, &self.progress_reporter)
            .await
            .map_err(AuditError::RegistrySession)?;

        Ok(results
            .into_iter()
            .map(|(component, result)| {
                ReportAssembler::from_scan(
                    component.as_str(),
                    result.image,
                    request.cutoff,
                    &result.scan,
                    allowlist,
                )
            })
            .collect())
    }
}
