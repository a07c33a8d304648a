use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a file was touched by a commit, as classified by the history miner.
///
/// # Examples
///
/// ```
/// use busfactor_core::ChangeType;
///
/// let ct = ChangeType::Rename;
/// assert_eq!(format!("{ct}"), "rename");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// File created.
    Add,
    /// File removed.
    Delete,
    /// File edited in place.
    Modify,
    /// File moved from `old_path` to `new_path`.
    Rename,
    /// File copied from `old_path` to `new_path`.
    Copy,
    /// Anything the miner could not classify (type changes, submodules).
    Unknown,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Add => write!(f, "add"),
            ChangeType::Delete => write!(f, "delete"),
            ChangeType::Modify => write!(f, "modify"),
            ChangeType::Rename => write!(f, "rename"),
            ChangeType::Copy => write!(f, "copy"),
            ChangeType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Output format for CLI reports.
///
/// # Examples
///
/// ```
/// use busfactor_core::OutputFormat;
///
/// let fmt: OutputFormat = "json".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Json);
///
/// let fmt: OutputFormat = "md".parse().unwrap();
/// assert_eq!(fmt, OutputFormat::Markdown);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable table.
    #[default]
    Text,
    /// Machine-readable JSON with camelCase keys.
    Json,
    /// GitHub-flavored Markdown table.
    Markdown,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

/// Ordering of report rows.
///
/// Every key breaks ties by path so reports are stable across runs.
///
/// # Examples
///
/// ```
/// use busfactor_core::SortKey;
///
/// assert_eq!("bus-factor".parse::<SortKey>().unwrap(), SortKey::BusFactor);
/// assert_eq!(SortKey::default(), SortKey::BusFactor);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Lowest bus factor first (riskiest files at the top).
    #[default]
    BusFactor,
    /// Fewest contributors first.
    Contributors,
    /// Most minor contributors first.
    Minor,
    /// Alphabetical by path.
    Path,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::BusFactor => write!(f, "bus-factor"),
            SortKey::Contributors => write!(f, "contributors"),
            SortKey::Minor => write!(f, "minor"),
            SortKey::Path => write!(f, "path"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "bus-factor" | "bus_factor" | "busfactor" => Ok(SortKey::BusFactor),
            "contributors" => Ok(SortKey::Contributors),
            "minor" => Ok(SortKey::Minor),
            "path" => Ok(SortKey::Path),
            other => Err(format!("unknown sort key: {other}")),
        }
    }
}
