/// Formatter adapters for the supported report formats
mod json_formatter;
mod junit_formatter;

pub use json_formatter::JsonFormatter;
pub use junit_formatter::JunitFormatter;
