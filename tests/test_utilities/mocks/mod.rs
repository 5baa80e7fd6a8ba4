/// Mock implementations for testing
mod mock_progress_reporter;
mod mock_readers;
mod mock_registry_client;

pub use mock_progress_reporter::MockProgressReporter;
pub use mock_readers::{MockAllowlistReader, MockCompositionReader};
pub use mock_registry_client::MockRegistryClient;
