use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Maximum length of a repository name accepted by the registry
const MAX_REPOSITORY_NAME_LENGTH: usize = 256;

/// Maximum length of an image tag accepted by the registry
const MAX_TAG_LENGTH: usize = 300;

/// Reference to one repository in a registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RepositoryRef {
    registry_id: Option<String>,
    repository_name: String,
}

impl RepositoryRef {
    pub fn new(registry_id: Option<String>, repository_name: impl Into<String>) -> Self {
        Self {
            registry_id: registry_id.filter(|id| !id.is_empty()),
            repository_name: repository_name.into(),
        }
    }

    pub fn registry_id(&self) -> Option<&str> {
        self.registry_id.as_deref()
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    /// Pins this repository to a tag
    pub fn with_tag(&self, tag: impl Into<String>) -> crate::shared::Result<ImageIdentity> {
        ImageIdentity::new(self.registry_id.clone(), self.repository_name.clone(), tag.into())
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.registry_id {
            Some(id) => write!(f, "{}/{}", id, self.repository_name),
            None => write!(f, "{}", self.repository_name),
        }
    }
}

/// One scannable artifact: repository plus tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImageIdentity {
    registry_id: Option<String>,
    repository_name: String,
    tag: String,
}

impl ImageIdentity {
    pub fn new(
        registry_id: Option<String>,
        repository_name: String,
        tag: String,
    ) -> crate::shared::Result<Self> {
        if repository_name.is_empty() {
            anyhow::bail!("Repository name cannot be empty");
        }
        if repository_name.len() > MAX_REPOSITORY_NAME_LENGTH {
            anyhow::bail!(
                "Repository name is too long ({} bytes). Maximum allowed: {} bytes",
                repository_name.len(),
                MAX_REPOSITORY_NAME_LENGTH
            );
        }
        if tag.is_empty() {
            anyhow::bail!("Image tag cannot be empty for repository {}", repository_name);
        }
        if tag.len() > MAX_TAG_LENGTH {
            anyhow::bail!(
                "Image tag is too long ({} bytes). Maximum allowed: {} bytes",
                tag.len(),
                MAX_TAG_LENGTH
            );
        }

        Ok(Self {
            registry_id: registry_id.filter(|id| !id.is_empty()),
            repository_name,
            tag,
        })
    }

    pub fn registry_id(&self) -> Option<&str> {
        self.registry_id.as_deref()
    }

    pub fn repository_name(&self) -> &str {
        &self.repository_name
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn repository(&self) -> RepositoryRef {
        RepositoryRef::new(self.registry_id.clone(), self.repository_name.clone())
    }
}

impl fmt::Display for ImageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository_name, self.tag)
    }
}

/// Tag listed for a repository
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageIdentifier {
    pub tag: String,
}

impl ImageIdentifier {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }
}

/// Push metadata for one tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDetail {
    pub tag: String,
    pub pushed_at: DateTime<Utc>,
}

impl ImageDetail {
    pub fn new(tag: impl Into<String>, pushed_at: DateTime<Utc>) -> Self {
        Self {
            tag: tag.into(),
            pushed_at,
        }
    }
}

/// Logical image name without registry or base-repository prefix
///
/// Used as the allowlist key, the batch result key and the report directory name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ComponentName(String);

impl ComponentName {
    pub fn new(name: impl Into<String>) -> crate::shared::Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            anyhow::bail!("Component name cannot be empty");
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
