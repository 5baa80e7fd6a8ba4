use super::image::ComponentName;

/// One component of a composition, pinned to a tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositionEntry {
    pub component: ComponentName,
    pub tag: String,
}

/// Set of component/tag pairs audited together in one batch run
///
/// Entries are kept sorted by component name and component names are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composition {
    entries: Vec<CompositionEntry>,
}

impl Composition {
    /// Builds a composition from already-normalized entries
    ///
    /// # Errors
    /// Returns an error if a tag is empty or a component appears twice
    pub fn new(mut entries: Vec<CompositionEntry>) -> crate::shared::Result<Self> {
        if let Some(entry) = entries.iter().find(|e| e.tag.trim().is_empty()) {
            anyhow::bail!("Component '{}' has an empty tag", entry.component);
        }
        entries.sort_by(|a, b| a.component.cmp(&b.component));
        if let Some(pair) = entries.windows(2).find(|w| w[0].component == w[1].component) {
            anyhow::bail!("Component '{}' is listed more than once", pair[0].component);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[CompositionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
