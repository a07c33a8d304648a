//! Core types, configuration, and error handling for busfactor.
//!
//! This crate provides the shared foundation used by the other busfactor crates:
//! - [`BusFactorError`]: unified error type using `thiserror` and `miette`
//! - [`BusFactorConfig`]: configuration loaded from `.busfactor.toml`
//! - Shared types: [`ChangeType`], [`OutputFormat`], [`SortKey`]

mod config;
mod error;
mod types;

pub use config::{BusFactorConfig, HistoryConfig, ReportConfig};
pub use error::BusFactorError;
pub use types::{ChangeType, OutputFormat, SortKey};

/// A convenience `Result` type for busfactor operations.
pub type Result<T> = std::result::Result<T, BusFactorError>;
