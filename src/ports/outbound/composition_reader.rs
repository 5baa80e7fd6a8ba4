use crate::scan_audit::domain::Composition;
use crate::shared::Result;
use std::path::Path;

/// CompositionReader port for loading a composition document
///
/// A composition maps component keys to image tags. Keys are normalized
/// into component names at load time.
pub trait CompositionReader {
    /// Reads and validates the composition at `path`
    ///
    /// # Errors
    /// Returns an error if the file is unreadable, is not a mapping of
    /// strings, or contains empty or conflicting entries
    fn read_composition(&self, path: &Path) -> Result<Composition>;
}
