use crate::scan_audit::domain::{ImageDetail, ImageIdentifier};
use crate::shared::error::RegistryError;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Reasons the latest tag of a repository cannot be determined
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("no tagged images found in repository {repository}")]
    NoTagsFound { repository: String },

    #[error("all tags in repository {repository} contain the filter '{filter}'; check the filter and the available tags")]
    AllTagsFiltered { repository: String, filter: String },

    #[error("could not retrieve image details for repository {repository}: {details}")]
    MetadataUnavailable { repository: String, details: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ResolutionError {
    pub fn is_session_failure(&self) -> bool {
        matches!(self, ResolutionError::Registry(e) if e.is_session_failure())
    }
}

/// TagSelector - pure selection steps of latest-tag resolution
///
/// The registry calls live in `LatestTagResolver`; this service only
/// filters candidates and compares push timestamps.
pub struct TagSelector;

impl TagSelector {
    /// Drops every identifier whose tag contains `filter`
    ///
    /// # Errors
    /// - `NoTagsFound` when `identifiers` is empty
    /// - `AllTagsFiltered` when the filter removes every candidate
    pub fn filter_identifiers(
        repository: &str,
        identifiers: Vec<ImageIdentifier>,
        filter: Option<&str>,
    ) -> Result<Vec<ImageIdentifier>, ResolutionError> {
        if identifiers.is_empty() {
            return Err(ResolutionError::NoTagsFound {
                repository: repository.to_string(),
            });
        }

        let filter = match filter {
            Some(f) if !f.is_empty() => f,
            _ => return Ok(identifiers),
        };

        let before = identifiers.len();
        let remaining: Vec<ImageIdentifier> = identifiers
            .into_iter()
            .filter(|id| !id.tag.contains(filter))
            .collect();

        log::info!(
            "{} of {} tags in {} matched filter '{}'",
            before - remaining.len(),
            before,
            repository,
            filter
        );

        if remaining.is_empty() {
            return Err(ResolutionError::AllTagsFiltered {
                repository: repository.to_string(),
                filter: filter.to_string(),
            });
        }

        Ok(remaining)
    }

    /// Picks the tag with the smallest elapsed time since push
    ///
    /// Ties keep the first detail seen. A single detail is returned without comparison.
    pub fn select_latest(
        repository: &str,
        details: &[ImageDetail],
        now: DateTime<Utc>,
    ) -> Result<String, ResolutionError> {
        let (first, rest) = details
            .split_first()
            .ok_or_else(|| ResolutionError::MetadataUnavailable {
                repository: repository.to_string(),
                details: "registry returned no image details".to_string(),
            })?;

        let mut latest = first;
        let mut min_age = now - first.pushed_at;
        for detail in rest {
            let age = now - detail.pushed_at;
            if age < min_age {
                min_age = age;
                latest = detail;
            }
        }

        Ok(latest.tag.clone())
    }
}
