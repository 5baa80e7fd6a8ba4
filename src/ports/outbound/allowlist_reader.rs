use crate::scan_audit::domain::Allowlist;
use crate::shared::Result;
use std::path::Path;

/// AllowlistReader port for loading the allowlist document
pub trait AllowlistReader {
    /// Loads the allowlist
    ///
    /// # Arguments
    /// * `path` - Location of the document; `None` yields an empty allowlist
    ///
    /// # Returns
    /// The parsed allowlist. A path that does not exist also yields an empty
    /// allowlist.
    ///
    /// # Errors
    /// Returns an error if the document exists but cannot be read or parsed,
    /// or if it contains an empty pattern
    fn read_allowlist(&self, path: Option<&Path>) -> Result<Allowlist>;
}
