use super::resolve_latest_tag::LatestTagResolver;
use crate::application::dto::TagSelection;
use crate::ports::outbound::{ProgressReporter, RegistryClient};
use crate::scan_audit::domain::{ComponentName, ImageIdentity, RepositoryRef, ScanFindings};
use crate::scan_audit::services::ResolutionError;
use crate::shared::error::RegistryError;
use dashmap::DashMap;
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;

/// One image to fetch in a batch
#[derive(Debug, Clone)]
pub struct BatchTarget {
    pub component: ComponentName,
    pub repository: RepositoryRef,
    pub tag: TagSelection,
}

/// Outcome for one batch target
///
/// `image` is `None` when the tag could not be resolved; `scan` is then a
/// failed result explaining why.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub image: Option<ImageIdentity>,
    pub scan: ScanFindings,
}

impl BatchResult {
    fn failed(image: Option<ImageIdentity>, message: String) -> Self {
        Self {
            image,
            scan: ScanFindings::failed(message),
        }
    }
}

/// ScanResultAggregator - Fetches scan findings for one image or a batch
///
/// In batch mode every target is isolated: resolution and retrieval errors
/// become failed results for that target only. Only errors meaning the
/// registry cannot be used at all abort the batch.
pub struct ScanResultAggregator<'a, R: RegistryClient> {
    registry: &'a R,
    latest_filter: Option<String>,
}

impl<'a, R: RegistryClient> ScanResultAggregator<'a, R> {
    pub fn new(registry: &'a R, latest_filter: Option<String>) -> Self {
        Self {
            registry,
            latest_filter,
        }
    }

    /// Retrieves the findings of a single image
    pub async fn get_findings(&self, image: &ImageIdentity) -> Result<ScanFindings, RegistryError> {
        self.registry.get_scan_findings(image).await
    }

    /// Retrieves findings for every target, at most `concurrency` at a time
    ///
    /// # Returns
    /// One result per target keyed by component name
    ///
    /// # Errors
    /// The first session failure (authentication or transport) seen by any
    /// target. Remaining targets are skipped once one has been recorded.
    pub async fn get_findings_batch<P: ProgressReporter>(
        &self,
        targets: Vec<BatchTarget>,
        concurrency: usize,
        progress_reporter: &P,
    ) -> Result<BTreeMap<ComponentName, BatchResult>, RegistryError> {
        let total = targets.len();
        let results: DashMap<ComponentName, BatchResult> = DashMap::with_capacity(total);
        let session_error: OnceLock<RegistryError> = OnceLock::new();
        let completed = AtomicUsize::new(0);

        let results_ref = &results;
        let session_error_ref = &session_error;
        let completed_ref = &completed;

        stream::iter(targets)
            .for_each_concurrent(concurrency.max(1), |target| async move {
                if session_error_ref.get().is_some() {
                    return;
                }

                match self.fetch_one(&target).await {
                    Ok(result) => {
                        results_ref.insert(target.component.clone(), result);
                    }
                    Err(error) => {
                        log::error!("{}: {}", target.component, error);
                        let _ = session_error_ref.set(error);
                    }
                }

                let done = completed_ref.fetch_add(1, Ordering::SeqCst) + 1;
                progress_reporter.report_progress(done, total, Some(target.component.as_str()));
            })
            .await;

        if let Some(error) = session_error.into_inner() {
            return Err(error);
        }

        Ok(results.into_iter().collect())
    }

    /// Resolves and fetches one target
    ///
    /// Only session failures are returned as `Err`; everything else is a
    /// failed `BatchResult`.
    async fn fetch_one(&self, target: &BatchTarget) -> Result<BatchResult, RegistryError> {
        let tag = match &target.tag {
            TagSelection::Fixed(tag) => tag.clone(),
            TagSelection::Latest => {
                let resolver = LatestTagResolver::new(self.registry);
                match resolver
                    .resolve(&target.repository, self.latest_filter.as_deref())
                    .await
                {
                    Ok(tag) => tag,
                    Err(ResolutionError::Registry(error)) if error.is_session_failure() => {
                        return Err(error);
                    }
                    Err(error) => {
                        log::warn!("{}: {}", target.component, error);
                        return Ok(BatchResult::failed(None, error.to_string()));
                    }
                }
            }
        };

        let image = match target.repository.with_tag(tag) {
            Ok(image) => image,
            Err(error) => return Ok(BatchResult::failed(None, error.to_string())),
        };

        match self.registry.get_scan_findings(&image).await {
            Ok(scan) => {
                log::debug!(
                    "{}: {} finding(s), scan status {}",
                    image,
                    scan.findings.len(),
                    scan.status
                );
                Ok(BatchResult {
                    image: Some(image),
                    scan,
                })
            }
            Err(error) if error.is_session_failure() => Err(error),
            Err(error) => {
                log::warn!("{}: {}", image, error);
                let message = format!("{}: {}", image, error);
                Ok(BatchResult::failed(Some(image), message))
            }
        }
    }
}
