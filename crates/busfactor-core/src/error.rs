use std::path::PathBuf;

/// Errors that can occur while mining history or loading configuration.
///
/// The metric computation itself never fails; every variant here comes from
/// the edges of the system (filesystem, git, config parsing). The binary
/// renders these through `miette`.
///
/// # Examples
///
/// ```
/// use busfactor_core::BusFactorError;
///
/// let err = BusFactorError::Git("failed to open repository".into());
/// assert!(err.to_string().contains("failed to open repository"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum BusFactorError {
    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("check the values in .busfactor.toml"))]
    Config(String),

    /// Git operation failure.
    #[error("git error: {0}")]
    Git(String),

    /// JSON serialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A required file was not found.
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: BusFactorError = io_err.into();
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn git_error_displays_message() {
        let err = BusFactorError::Git("bad revision".into());
        assert_eq!(err.to_string(), "git error: bad revision");
    }

    #[test]
    fn toml_error_converts() {
        let toml_err = toml::from_str::<toml::Value>("= nope").unwrap_err();
        let err: BusFactorError = toml_err.into();
        assert!(err.to_string().starts_with("TOML parse error"));
    }

    #[test]
    fn json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BusFactorError = json_err.into();
        assert!(matches!(err, BusFactorError::Serialization(_)));
        assert!(err.to_string().starts_with("serialization error"));
    }

    #[test]
    fn file_not_found_shows_path() {
        let err = BusFactorError::FileNotFound(PathBuf::from("/tmp/.busfactor.toml"));
        assert!(err.to_string().contains("/tmp/.busfactor.toml"));
    }
}
