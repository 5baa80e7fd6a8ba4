/// Filesystem adapters for file I/O operations
mod file_reader;
mod file_writer;
mod snapshot_registry;

pub use file_reader::FileSystemReader;
pub use file_writer::ReportDirectoryWriter;
pub use snapshot_registry::SnapshotRegistry;
