/// Outbound ports (Driven ports) - Infrastructure interfaces
///
/// These ports define the interfaces that the audit core uses
/// to interact with external systems (registry, file system, console).
pub mod allowlist_reader;
pub mod composition_reader;
pub mod progress_reporter;
pub mod registry_client;
pub mod report_formatter;
pub mod report_writer;

pub use allowlist_reader::AllowlistReader;
pub use composition_reader::CompositionReader;
pub use progress_reporter::ProgressReporter;
pub use registry_client::{RegistryClient, RegistryResult};
pub use report_formatter::ReportFormatter;
pub use report_writer::ReportWriter;
