//! Git history analysis: contributor counts, minor contributors, and bus factor.
//!
//! Mines git history using git2, attributes every added or deleted line to
//! its author under the file's newest name, and reduces the per-author
//! totals to three per-file metrics that flag single-person dependencies.

pub mod contributors;
pub mod metrics;
pub mod mining;
