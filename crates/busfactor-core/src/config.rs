use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BusFactorError;
use crate::types::SortKey;

/// Top-level configuration loaded from `.busfactor.toml`.
///
/// Supports layered resolution: CLI flags > local config > defaults.
///
/// # Examples
///
/// ```
/// use busfactor_core::BusFactorConfig;
///
/// let config = BusFactorConfig::default();
/// assert_eq!(config.report.limit, 20);
/// assert!(config.history.since_days.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BusFactorConfig {
    /// Which slice of history to analyze.
    #[serde(default)]
    pub history: HistoryConfig,
    /// How results are presented.
    #[serde(default)]
    pub report: ReportConfig,
}

impl BusFactorConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`BusFactorError::FileNotFound`] if `path` does not exist,
    /// [`BusFactorError::Io`] if it cannot be read, or
    /// [`BusFactorError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use busfactor_core::BusFactorConfig;
    /// use std::path::Path;
    ///
    /// let config = BusFactorConfig::from_file(Path::new(".busfactor.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, BusFactorError> {
        if !path.exists() {
            return Err(BusFactorError::FileNotFound(path.to_path_buf()));
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`BusFactorError::Toml`] if parsing fails, or
    /// [`BusFactorError::Config`] if `report.limit` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use busfactor_core::{BusFactorConfig, SortKey};
    ///
    /// let toml = r#"
    /// [report]
    /// limit = 50
    /// sort = "contributors"
    /// "#;
    /// let config = BusFactorConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.report.limit, 50);
    /// assert_eq!(config.report.sort, SortKey::Contributors);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, BusFactorError> {
        let config: Self = toml::from_str(content)?;
        if config.report.limit == 0 {
            return Err(BusFactorError::Config(
                "report.limit must be at least 1".into(),
            ));
        }
        Ok(config)
    }
}

/// History window configuration.
///
/// All bounds are optional; an empty section analyzes the full history
/// reachable from HEAD.
///
/// # Examples
///
/// ```
/// use busfactor_core::HistoryConfig;
///
/// let config = HistoryConfig::default();
/// assert!(config.branch.is_none());
/// assert!(config.from_commit.is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Only include commits from the last N days.
    pub since_days: Option<u64>,
    /// Branch to walk instead of HEAD.
    pub branch: Option<String>,
    /// Oldest commit to include (inclusive).
    pub from_commit: Option<String>,
    /// Newest commit to include (inclusive).
    pub to_commit: Option<String>,
}

/// Report presentation configuration.
///
/// # Examples
///
/// ```
/// use busfactor_core::{ReportConfig, SortKey};
///
/// let config = ReportConfig::default();
/// assert_eq!(config.limit, 20);
/// assert_eq!(config.sort, SortKey::BusFactor);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Maximum rows to print (default: 20).
    #[serde(default = "default_limit")]
    pub limit: usize,
    /// Row ordering (default: bus factor ascending).
    #[serde(default)]
    pub sort: SortKey,
}

fn default_limit() -> usize {
    20
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            limit: default_limit(),
            sort: SortKey::default(),
        }
    }
}
