use crate::scan_audit::domain::{ComponentName, Composition, CompositionEntry};
use crate::shared::Result;

/// Suffix carried by composition keys that is not part of the component name
const VERSION_SUFFIX: &str = "_version";

/// ComponentNaming policy for mapping between composition keys, component
/// names and repository names
///
/// Repository names are `<base_repo>/<component>`, or just `<component>`
/// when no base repository is configured.
pub struct ComponentNaming;

impl ComponentNaming {
    /// Normalizes a composition key into a component name
    ///
    /// Strips a trailing `_version`, then turns underscores into hyphens:
    /// `nexus_iq_version` becomes `nexus-iq`.
    pub fn normalize_composition_key(key: &str) -> String {
        let key = key.trim();
        let key = key.strip_suffix(VERSION_SUFFIX).unwrap_or(key);
        key.replace('_', "-")
    }

    /// Builds a composition from raw document entries, normalizing every key
    ///
    /// # Errors
    /// - A key that normalizes to an empty name
    /// - An empty tag
    /// - Two keys normalizing to the same component (e.g. `api_version` and `api`)
    pub fn composition_from_document(
        document: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Composition> {
        let mut entries = Vec::new();
        for (key, tag) in document {
            let normalized = Self::normalize_composition_key(&key);
            let component = ComponentName::new(normalized.as_str()).map_err(|_| {
                anyhow::anyhow!("Composition key '{}' does not name a component", key)
            })?;
            if let Some(existing) = entries
                .iter()
                .find(|e: &&(String, CompositionEntry)| e.1.component == component)
            {
                anyhow::bail!(
                    "Composition keys '{}' and '{}' both name component '{}'",
                    existing.0,
                    key,
                    component
                );
            }
            entries.push((
                key,
                CompositionEntry {
                    component,
                    tag: tag.trim().to_string(),
                },
            ));
        }
        Composition::new(entries.into_iter().map(|(_, entry)| entry).collect())
    }

    /// Repository name holding the given component
    pub fn repository_for_component(base_repo: &str, component: &str) -> String {
        let base = base_repo.trim_end_matches('/');
        if base.is_empty() {
            component.to_string()
        } else {
            format!("{}/{}", base, component)
        }
    }

    /// Component name of a repository, or `None` when the repository is not
    /// under the base repository
    pub fn component_from_repository(repository: &str, base_repo: &str) -> Option<String> {
        let base = base_repo.trim_end_matches('/');
        if base.is_empty() {
            return Some(repository.to_string()).filter(|r| !r.is_empty());
        }
        repository
            .strip_prefix(base)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|component| !component.is_empty())
            .map(str::to_string)
    }
}
