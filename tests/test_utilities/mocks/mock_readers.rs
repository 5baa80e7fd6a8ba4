use ecr_scan_audit::prelude::*;
use ecr_scan_audit::scan_audit::domain::CompositionEntry;
use std::path::Path;

/// Mock AllowlistReader returning a fixed allowlist
#[derive(Default)]
pub struct MockAllowlistReader {
    pub allowlist: Allowlist,
}

impl MockAllowlistReader {
    pub fn new(allowlist: Allowlist) -> Self {
        Self { allowlist }
    }
}

impl AllowlistReader for MockAllowlistReader {
    fn read_allowlist(&self, _path: Option<&Path>) -> Result<Allowlist> {
        Ok(self.allowlist.clone())
    }
}

/// Mock CompositionReader returning fixed component/tag pairs
#[derive(Default)]
pub struct MockCompositionReader {
    pub entries: Vec<(String, String)>,
}

impl MockCompositionReader {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(c, t)| (c.to_string(), t.to_string()))
                .collect(),
        }
    }
}

impl CompositionReader for MockCompositionReader {
    fn read_composition(&self, _path: &Path) -> Result<Composition> {
        let entries = self
            .entries
            .iter()
            .map(|(component, tag)| {
                Ok(CompositionEntry {
                    component: ComponentName::new(component.as_str())?,
                    tag: tag.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Composition::new(entries)
    }
}
