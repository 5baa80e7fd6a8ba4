use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Severity level as reported by the registry scanner
///
/// Variants are declared in rank order, so the derived `Ord` is the
/// severity order: `Informational < Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SeverityLevel {
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    /// All levels, lowest first
    pub const ALL: [SeverityLevel; 5] = [
        SeverityLevel::Informational,
        SeverityLevel::Low,
        SeverityLevel::Medium,
        SeverityLevel::High,
        SeverityLevel::Critical,
    ];

    /// Numeric rank of the level (0 = INFORMATIONAL, 4 = CRITICAL)
    pub fn rank(self) -> u8 {
        self as u8
    }

    /// Returns true when a finding of this severity counts as a failure at `cutoff`.
    ///
    /// The boundary is inclusive: a finding exactly at the cutoff fails.
    pub fn meets_cutoff(self, cutoff: SeverityLevel) -> bool {
        self.rank() >= cutoff.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SeverityLevel::Informational => "INFORMATIONAL",
            SeverityLevel::Low => "LOW",
            SeverityLevel::Medium => "MEDIUM",
            SeverityLevel::High => "HIGH",
            SeverityLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeverityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "INFORMATIONAL" => Ok(SeverityLevel::Informational),
            "LOW" => Ok(SeverityLevel::Low),
            "MEDIUM" => Ok(SeverityLevel::Medium),
            "HIGH" => Ok(SeverityLevel::High),
            "CRITICAL" => Ok(SeverityLevel::Critical),
            _ => Err(format!(
                "Invalid severity: {}. Please specify one of INFORMATIONAL, LOW, MEDIUM, HIGH, CRITICAL",
                s
            )),
        }
    }
}

/// Severity attached to a finding
///
/// Scanners may report values outside the known levels (ECR uses
/// `UNDEFINED`). Those are kept verbatim and never ranked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FindingSeverity {
    Known(SeverityLevel),
    Undefined(String),
}

impl FindingSeverity {
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<SeverityLevel>() {
            Ok(level) => FindingSeverity::Known(level),
            Err(_) => FindingSeverity::Undefined(raw.to_string()),
        }
    }

    pub fn level(&self) -> Option<SeverityLevel> {
        match self {
            FindingSeverity::Known(level) => Some(*level),
            FindingSeverity::Undefined(_) => None,
        }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, FindingSeverity::Undefined(_))
    }
}

impl From<SeverityLevel> for FindingSeverity {
    fn from(level: SeverityLevel) -> Self {
        FindingSeverity::Known(level)
    }
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingSeverity::Known(level) => write!(f, "{}", level),
            FindingSeverity::Undefined(raw) if raw.is_empty() => write!(f, "UNDEFINED"),
            FindingSeverity::Undefined(raw) => write!(f, "{}", raw),
        }
    }
}
