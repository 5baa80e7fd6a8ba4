/// Use cases module containing application business logic orchestration
mod aggregate_scan_results;
mod audit_images;
mod resolve_latest_tag;

pub use aggregate_scan_results::{BatchResult, BatchTarget, ScanResultAggregator};
pub use audit_images::AuditImagesUseCase;
pub use resolve_latest_tag::LatestTagResolver;
