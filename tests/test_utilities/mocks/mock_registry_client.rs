use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ecr_scan_audit::ports::outbound::RegistryResult;
use ecr_scan_audit::prelude::*;
use ecr_scan_audit::scan_audit::domain::{ImageDetail, ImageIdentifier};
use ecr_scan_audit::shared::error::RegistryError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Mock RegistryClient backed by in-memory repositories
///
/// Images without recorded findings answer `ScanNotFound`.
#[derive(Default)]
pub struct MockRegistryClient {
    pub images: HashMap<String, Vec<(String, DateTime<Utc>)>>,
    pub findings: HashMap<String, RegistryResult<ScanFindings>>,
    /// When set, every call fails with this error
    pub session_error: Option<RegistryError>,
    /// Artificial latency of `get_scan_findings`, keyed by "repository:tag"
    pub scan_delays: HashMap<String, Duration>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockRegistryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, repository: &str, tag: &str, pushed_at: DateTime<Utc>) -> Self {
        self.images
            .entry(repository.to_string())
            .or_default()
            .push((tag.to_string(), pushed_at));
        self
    }

    pub fn with_findings(mut self, repository: &str, tag: &str, findings: Vec<Finding>) -> Self {
        self.findings.insert(
            format!("{}:{}", repository, tag),
            Ok(ScanFindings::succeeded(findings, HashMap::new())),
        );
        self
    }

    pub fn with_scan_error(mut self, repository: &str, tag: &str, error: RegistryError) -> Self {
        self.findings
            .insert(format!("{}:{}", repository, tag), Err(error));
        self
    }

    pub fn with_session_error(mut self, error: RegistryError) -> Self {
        self.session_error = Some(error);
        self
    }

    pub fn with_scan_delay(mut self, repository: &str, tag: &str, delay: Duration) -> Self {
        self.scan_delays
            .insert(format!("{}:{}", repository, tag), delay);
        self
    }

    /// Highest number of `get_scan_findings` calls observed running at once
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn check_session(&self) -> RegistryResult<()> {
        match &self.session_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RegistryClient for MockRegistryClient {
    async fn list_repositories(
        &self,
        registry_id: Option<&str>,
    ) -> RegistryResult<Vec<RepositoryRef>> {
        self.check_session()?;
        let mut names: Vec<_> = self.images.keys().cloned().collect();
        names.sort();
        Ok(names
            .into_iter()
            .map(|name| RepositoryRef::new(registry_id.map(str::to_string), name))
            .collect())
    }

    async fn list_image_identifiers(
        &self,
        repository: &RepositoryRef,
    ) -> RegistryResult<Vec<ImageIdentifier>> {
        self.check_session()?;
        self.images
            .get(repository.repository_name())
            .map(|images| {
                images
                    .iter()
                    .map(|(tag, _)| ImageIdentifier::new(tag.as_str()))
                    .collect()
            })
            .ok_or_else(|| RegistryError::RepositoryNotFound(repository.to_string()))
    }

    async fn get_image_details(
        &self,
        repository: &RepositoryRef,
        identifiers: &[ImageIdentifier],
    ) -> RegistryResult<Vec<ImageDetail>> {
        self.check_session()?;
        let images = self
            .images
            .get(repository.repository_name())
            .ok_or_else(|| RegistryError::RepositoryNotFound(repository.to_string()))?;
        Ok(identifiers
            .iter()
            .filter_map(|id| {
                images
                    .iter()
                    .find(|(tag, _)| *tag == id.tag)
                    .map(|(tag, pushed_at)| ImageDetail::new(tag.as_str(), *pushed_at))
            })
            .collect())
    }

    async fn get_scan_findings(&self, image: &ImageIdentity) -> RegistryResult<ScanFindings> {
        self.check_session()?;
        let key = image.to_string();

        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        if let Some(delay) = self.scan_delays.get(&key) {
            tokio::time::sleep(*delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.findings
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Err(RegistryError::ScanNotFound(key)))
    }
}
