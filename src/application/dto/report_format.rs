/// Report format enumeration for audit output
///
/// Shared by the CLI, the config file and the formatter factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// JUnit XML test suite (default)
    #[default]
    Junit,
    /// JSON document with the same content
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "junit" | "xml" => Ok(ReportFormat::Junit),
            "json" => Ok(ReportFormat::Json),
            _ => Err(format!(
                "Invalid format: {}. Please specify 'junit' or 'json'",
                s
            )),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportFormat::Junit => write!(f, "junit"),
            ReportFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_report_format_from_str() {
        assert_eq!(ReportFormat::from_str("junit").unwrap(), ReportFormat::Junit);
        assert_eq!(ReportFormat::from_str("XML").unwrap(), ReportFormat::Junit);
        assert_eq!(ReportFormat::from_str("Json").unwrap(), ReportFormat::Json);
    }

    #[test]
    fn test_report_format_from_str_invalid() {
        let error = ReportFormat::from_str("markdown").unwrap_err();
        assert!(error.contains("Invalid format: markdown"));
        assert!(error.contains("junit"));
        assert!(ReportFormat::from_str("").is_err());
    }

    #[test]
    fn test_report_format_display_round_trips() {
        for format in [ReportFormat::Junit, ReportFormat::Json] {
            assert_eq!(ReportFormat::from_str(&format.to_string()).unwrap(), format);
        }
        assert_eq!(ReportFormat::default(), ReportFormat::Junit);
    }
}
