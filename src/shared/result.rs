/// Result alias used at application boundaries.
/// Domain services return their own typed errors; everything above them speaks anyhow.
pub type Result<T> = std::result::Result<T, anyhow::Error>;
