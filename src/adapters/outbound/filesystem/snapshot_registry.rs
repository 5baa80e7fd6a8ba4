use crate::adapters::outbound::network::ecr_types::{
    details_for, scan_findings_from, DescribeImageScanFindingsResponse, DescribeImagesResponse,
};
use crate::ports::outbound::{RegistryClient, RegistryResult};
use crate::scan_audit::domain::{
    ImageDetail, ImageIdentifier, ImageIdentity, RepositoryRef, ScanFindings,
};
use crate::shared::error::RegistryError;
use crate::shared::security::{
    validate_file_size, validate_regular_file, validate_relative_path, MAX_SNAPSHOT_SIZE,
};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGES_FILE: &str = "images.json";
const FINDINGS_DIR: &str = "findings";

/// SnapshotRegistry adapter serving registry data exported to disk
///
/// Layout, one directory per repository (nested names allowed):
///
/// ```text
/// <root>/<repository>/images.json          DescribeImages response
/// <root>/<repository>/findings/<tag>.json  DescribeImageScanFindings response
/// ```
///
/// Registry ids are ignored; a snapshot holds a single registry.
pub struct SnapshotRegistry {
    root: PathBuf,
}

impl SnapshotRegistry {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn repository_dir(&self, repository: &str) -> RegistryResult<PathBuf> {
        validate_relative_path(repository)
            .map_err(|e| RegistryError::InvalidParameter(e.to_string()))?;
        let dir = self.root.join(repository);
        if !dir.join(IMAGES_FILE).is_file() {
            return Err(RegistryError::RepositoryNotFound(format!(
                "{} is not in snapshot {}",
                repository,
                self.root.display()
            )));
        }
        Ok(dir)
    }

    fn read_json<T: DeserializeOwned>(path: &Path) -> RegistryResult<T> {
        let size = validate_regular_file(path, "snapshot document")
            .map_err(|e| RegistryError::ServerError(e.to_string()))?;
        validate_file_size(size, path, MAX_SNAPSHOT_SIZE)
            .map_err(|e| RegistryError::ServerError(e.to_string()))?;
        let content = fs::read_to_string(path).map_err(|e| {
            RegistryError::ServerError(format!("failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            RegistryError::MalformedResponse(format!("{}: {}", path.display(), e))
        })
    }

    fn read_images(&self, repository: &str) -> RegistryResult<DescribeImagesResponse> {
        let dir = self.repository_dir(repository)?;
        Self::read_json(&dir.join(IMAGES_FILE))
    }

    /// Collects every directory below `dir` holding an images file
    fn collect_repositories(&self, dir: &Path, found: &mut Vec<String>) -> RegistryResult<()> {
        let entries = fs::read_dir(dir).map_err(|e| {
            RegistryError::Transport(format!("cannot read snapshot {}: {}", dir.display(), e))
        })?;

        let is_repository = dir.join(IMAGES_FILE).is_file();
        if is_repository {
            if let Ok(relative) = dir.strip_prefix(&self.root) {
                let name = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                if !name.is_empty() {
                    found.push(name);
                }
            }
        }

        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            // Symlinked directories are not followed
            if !file_type.is_dir() {
                continue;
            }
            if is_repository && entry.file_name() == FINDINGS_DIR {
                continue;
            }
            self.collect_repositories(&path, found)?;
        }
        Ok(())
    }
}

#[async_trait]
impl RegistryClient for SnapshotRegistry {
    async fn list_repositories(
        &self,
        registry_id: Option<&str>,
    ) -> RegistryResult<Vec<RepositoryRef>> {
        let mut names = Vec::new();
        self.collect_repositories(&self.root, &mut names)?;
        names.sort();
        log::debug!(
            "Snapshot {} holds {} repositories",
            self.root.display(),
            names.len()
        );
        Ok(names
            .into_iter()
            .map(|name| RepositoryRef::new(registry_id.map(str::to_string), name))
            .collect())
    }

    async fn list_image_identifiers(
        &self,
        repository: &RepositoryRef,
    ) -> RegistryResult<Vec<ImageIdentifier>> {
        let images = self.read_images(repository.repository_name())?;
        let mut identifiers: Vec<ImageIdentifier> = Vec::new();
        for detail in &images.image_details {
            for tag in &detail.image_tags {
                let identifier = ImageIdentifier::new(tag.as_str());
                if !tag.is_empty() && !identifiers.contains(&identifier) {
                    identifiers.push(identifier);
                }
            }
        }
        Ok(identifiers)
    }

    async fn get_image_details(
        &self,
        repository: &RepositoryRef,
        identifiers: &[ImageIdentifier],
    ) -> RegistryResult<Vec<ImageDetail>> {
        let images = self.read_images(repository.repository_name())?;
        Ok(details_for(&images.image_details, identifiers))
    }

    async fn get_scan_findings(&self, image: &ImageIdentity) -> RegistryResult<ScanFindings> {
        let images = self.read_images(image.repository_name())?;
        let tag = image.tag();
        let known = images
            .image_details
            .iter()
            .any(|detail| detail.image_tags.iter().any(|t| t == tag));
        if !known || tag.contains('/') {
            return Err(RegistryError::ImageNotFound(format!(
                "{} is not in snapshot {}",
                image,
                self.root.display()
            )));
        }

        let path = self
            .root
            .join(image.repository_name())
            .join(FINDINGS_DIR)
            .join(format!("{}.json", tag));
        if !path.exists() {
            return Err(RegistryError::ScanNotFound(format!(
                "no scan findings recorded for {}",
                image
            )));
        }

        let page: DescribeImageScanFindingsResponse = Self::read_json(&path)?;
        Ok(scan_findings_from(vec![page]))
    }
}
