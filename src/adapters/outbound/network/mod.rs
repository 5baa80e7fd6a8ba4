/// Network adapters for external API calls
mod ecr_client;
pub(crate) mod ecr_types;

pub use ecr_client::{EcrClientConfig, EcrRegistryClient};
