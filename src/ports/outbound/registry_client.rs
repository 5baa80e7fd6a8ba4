use crate::scan_audit::domain::{
    ImageDetail, ImageIdentifier, ImageIdentity, RepositoryRef, ScanFindings,
};
use crate::shared::error::RegistryError;
use async_trait::async_trait;

/// Result type of registry calls
pub type RegistryResult<T> = std::result::Result<T, RegistryError>;

/// RegistryClient port for listing images and retrieving scan findings
///
/// Abstracts the container registry and its image scanner (Amazon ECR or
/// an offline snapshot of it). Implementations follow pagination
/// internally and return complete result sets.
///
/// # Async Support
/// Implementations must be `Send + Sync`; the batch aggregator issues
/// calls for many images concurrently through one shared client.
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Lists every repository in the registry
    ///
    /// # Arguments
    /// * `registry_id` - Registry (account) id; `None` means the caller's default registry
    async fn list_repositories(
        &self,
        registry_id: Option<&str>,
    ) -> RegistryResult<Vec<RepositoryRef>>;

    /// Lists the tags of all tagged images in a repository
    async fn list_image_identifiers(
        &self,
        repository: &RepositoryRef,
    ) -> RegistryResult<Vec<ImageIdentifier>>;

    /// Fetches push timestamps for the given tags
    ///
    /// Images carrying several tags yield one detail per requested tag.
    async fn get_image_details(
        &self,
        repository: &RepositoryRef,
        identifiers: &[ImageIdentifier],
    ) -> RegistryResult<Vec<ImageDetail>>;

    /// Retrieves the completed scan findings of one image
    ///
    /// # Errors
    /// `ScanNotFound` when the image was never scanned, `ImageNotFound`
    /// when the tag does not exist, plus the general registry errors.
    async fn get_scan_findings(&self, image: &ImageIdentity) -> RegistryResult<ScanFindings>;
}
