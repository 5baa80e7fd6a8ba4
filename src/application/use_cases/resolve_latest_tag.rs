use crate::ports::outbound::RegistryClient;
use crate::scan_audit::domain::RepositoryRef;
use crate::scan_audit::services::{ResolutionError, TagSelector};
use chrono::Utc;

/// LatestTagResolver - Determines the most recently pushed tag of a repository
///
/// Drives the registry calls around the pure `TagSelector` steps: list the
/// tags, apply the filter, and only fetch push timestamps when more than
/// one candidate remains.
pub struct LatestTagResolver<'a, R: RegistryClient> {
    registry: &'a R,
}

impl<'a, R: RegistryClient> LatestTagResolver<'a, R> {
    pub fn new(registry: &'a R) -> Self {
        Self { registry }
    }

    /// Resolves the latest tag of `repository`
    ///
    /// # Arguments
    /// * `repository` - Repository to inspect
    /// * `filter` - Tags containing this substring are not considered
    ///
    /// # Errors
    /// - `NoTagsFound` / `AllTagsFiltered` when no candidate remains
    /// - `MetadataUnavailable` when the detail lookup fails or returns nothing
    /// - `Registry` when listing the tags fails
    pub async fn resolve(
        &self,
        repository: &RepositoryRef,
        filter: Option<&str>,
    ) -> Result<String, ResolutionError> {
        let name = repository.repository_name();
        let identifiers = self.registry.list_image_identifiers(repository).await?;
        let mut candidates = TagSelector::filter_identifiers(name, identifiers, filter)?;

        if candidates.len() == 1 {
            let only = candidates.remove(0);
            log::debug!("{} has a single candidate tag {}", name, only.tag);
            return Ok(only.tag);
        }

        let details = self
            .registry
            .get_image_details(repository, &candidates)
            .await
            .map_err(|e| {
                if e.is_session_failure() {
                    ResolutionError::Registry(e)
                } else {
                    ResolutionError::MetadataUnavailable {
                        repository: name.to_string(),
                        details: e.to_string(),
                    }
                }
            })?;

        let tag = TagSelector::select_latest(name, &details, Utc::now())?;
        log::debug!(
            "{}: selected tag {} out of {} candidates",
            name,
            tag,
            candidates.len()
        );
        Ok(tag)
    }
}
