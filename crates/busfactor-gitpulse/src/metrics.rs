//! Contributor count, minor-contributor count, and bus factor per file.
//!
//! Derived from a finished [`ContributionTable`]. Files whose contributions
//! sum to zero carry no metric and are left out of every result map.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use busfactor_core::SortKey;
use serde::{Deserialize, Serialize};

use crate::contributors::{CommitRecord, ContributionAccumulator, ContributionTable};

/// Share of a file's lines below which an author counts as minor.
pub const MINOR_CONTRIBUTOR_RATIO: f64 = 0.05;

/// Metrics for a single logical file.
///
/// # Examples
///
/// ```
/// use busfactor_gitpulse::metrics::FileMetrics;
///
/// let m = FileMetrics {
///     path: "src/main.rs".into(),
///     contributors: 4,
///     minor_contributors: 1,
///     bus_factor: 2,
///     total_lines: 1200,
/// };
/// assert!(m.bus_factor <= m.contributors);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetrics {
    /// Logical path (newest name across renames).
    pub path: String,
    /// Distinct authors who touched the file.
    pub contributors: u32,
    /// Authors with strictly less than 5% of the file's lines.
    pub minor_contributors: u32,
    /// Fewest top authors covering at least half of the file's lines.
    pub bus_factor: u32,
    /// Sum of added and deleted lines across all authors.
    pub total_lines: u64,
}

/// Bus factor of one file given each author's contribution.
///
/// Sorts descending, then counts the prefix sums strictly below half the
/// total and adds one.
///
/// # Examples
///
/// ```
/// use busfactor_gitpulse::metrics::bus_factor_of;
///
/// assert_eq!(bus_factor_of(&[10, 5]), 1);
/// assert_eq!(bus_factor_of(&[1, 1, 1, 1]), 2);
/// ```
pub fn bus_factor_of(contributions: &[u64]) -> u32 {
    let total: u64 = contributions.iter().sum();
    let half = total as f64 / 2.0;

    let mut sorted = contributions.to_vec();
    sorted.sort_unstable_by_key(|&v| Reverse(v));

    let mut cumulative = 0u64;
    let below_half = sorted
        .iter()
        .filter(|&&v| {
            cumulative += v;
            (cumulative as f64) < half
        })
        .count() as u32;

    below_half + 1
}

/// Number of authors whose share is strictly below [`MINOR_CONTRIBUTOR_RATIO`].
///
/// Returns 0 when the contributions sum to zero.
///
/// # Examples
///
/// ```
/// use busfactor_gitpulse::metrics::minor_count_of;
///
/// // 1/20 is exactly 5%, which is not minor.
/// assert_eq!(minor_count_of(&[1; 20]), 0);
/// assert_eq!(minor_count_of(&[1; 21]), 21);
/// assert_eq!(minor_count_of(&[96, 4]), 1);
/// ```
pub fn minor_count_of(contributions: &[u64]) -> u32 {
    let total: u64 = contributions.iter().sum();
    if total == 0 {
        return 0;
    }
    let total = total as f64;
    contributions
        .iter()
        .filter(|&&v| (v as f64 / total) < MINOR_CONTRIBUTOR_RATIO)
        .count() as u32
}

/// Final per-file metrics for one history traversal.
///
/// The three accessors return maps sorted by path, so two runs over the
/// same history produce identical output.
///
/// # Examples
///
/// ```
/// use busfactor_gitpulse::contributors::{CommitRecord, ModifiedFile};
/// use busfactor_gitpulse::metrics::ContributorsCount;
///
/// let history = vec![
///     CommitRecord {
///         hash: "1".into(),
///         author: "x@example.com".into(),
///         timestamp: 1,
///         modified_files: vec![ModifiedFile::add("a.py", 10)],
///     },
///     CommitRecord {
///         hash: "2".into(),
///         author: "y@example.com".into(),
///         timestamp: 2,
///         modified_files: vec![ModifiedFile::modify("a.py", 5, 0)],
///     },
/// ];
///
/// let metrics = ContributorsCount::from_chronological(&history);
/// assert_eq!(metrics.count()["a.py"], 2);
/// assert_eq!(metrics.count_minor()["a.py"], 0);
/// assert_eq!(metrics.bus_factor()["a.py"], 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributorsCount {
    contributors: BTreeMap<String, u32>,
    minor_contributors: BTreeMap<String, u32>,
    bus_factor: BTreeMap<String, u32>,
    total_lines: BTreeMap<String, u64>,
}

impl ContributorsCount {
    /// Derive metrics from a finished contribution table.
    pub fn finalize(table: &ContributionTable) -> Self {
        let mut metrics = Self::default();

        for (path, authors) in table.iter() {
            let values: Vec<u64> = authors.values().copied().collect();
            let total: u64 = values.iter().sum();
            if total == 0 {
                continue;
            }

            metrics
                .contributors
                .insert(path.to_string(), values.len() as u32);
            metrics
                .minor_contributors
                .insert(path.to_string(), minor_count_of(&values));
            metrics
                .bus_factor
                .insert(path.to_string(), bus_factor_of(&values));
            metrics.total_lines.insert(path.to_string(), total);
        }

        metrics
    }

    /// Accumulate and finalize a stream delivered newest commit first.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CommitRecord>,
    {
        Self::finalize(ContributionAccumulator::from_records(records).table())
    }

    /// Accumulate and finalize a stream delivered oldest commit first.
    pub fn from_chronological(commits: &[CommitRecord]) -> Self {
        Self::finalize(ContributionAccumulator::from_chronological(commits).table())
    }

    /// Number of distinct contributors per file.
    pub fn count(&self) -> &BTreeMap<String, u32> {
        &self.contributors
    }

    /// Number of contributors below 5% of the file's lines.
    pub fn count_minor(&self) -> &BTreeMap<String, u32> {
        &self.minor_contributors
    }

    /// Alias of [`count`](Self::count).
    pub fn contributor_count(&self) -> &BTreeMap<String, u32> {
        self.count()
    }

    /// Alias of [`count_minor`](Self::count_minor).
    pub fn minor_contributor_count(&self) -> &BTreeMap<String, u32> {
        self.count_minor()
    }

    /// Fewest contributors covering at least half of each file's lines.
    pub fn bus_factor(&self) -> &BTreeMap<String, u32> {
        &self.bus_factor
    }

    /// Total lines authored per file.
    pub fn total_lines(&self) -> &BTreeMap<String, u64> {
        &self.total_lines
    }

    /// Number of files with a metric.
    pub fn len(&self) -> usize {
        self.contributors.len()
    }

    /// Whether no file carries a metric.
    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }

    /// One row per file, in path order.
    pub fn rows(&self) -> Vec<FileMetrics> {
        self.contributors
            .iter()
            .map(|(path, &contributors)| FileMetrics {
                path: path.clone(),
                contributors,
                minor_contributors: self.minor_contributors.get(path).copied().unwrap_or(0),
                bus_factor: self.bus_factor.get(path).copied().unwrap_or(1),
                total_lines: self.total_lines.get(path).copied().unwrap_or(0),
            })
            .collect()
    }
}

/// Order report rows by `key`, breaking ties by path.
///
/// # Examples
///
/// ```
/// use busfactor_core::SortKey;
/// use busfactor_gitpulse::metrics::{sort_rows, FileMetrics};
///
/// let row = |path: &str, bus_factor| FileMetrics {
///     path: path.into(),
///     contributors: 3,
///     minor_contributors: 0,
///     bus_factor,
///     total_lines: 10,
/// };
/// let mut rows = vec![row("b.rs", 2), row("a.rs", 1)];
/// sort_rows(&mut rows, SortKey::BusFactor);
/// assert_eq!(rows[0].path, "a.rs");
/// ```
pub fn sort_rows(rows: &mut [FileMetrics], key: SortKey) {
    match key {
        SortKey::BusFactor => rows.sort_by(|a, b| {
            a.bus_factor
                .cmp(&b.bus_factor)
                .then_with(|| b.total_lines.cmp(&a.total_lines))
                .then_with(|| a.path.cmp(&b.path))
        }),
        SortKey::Contributors => rows.sort_by(|a, b| {
            a.contributors
                .cmp(&b.contributors)
                .then_with(|| a.path.cmp(&b.path))
        }),
        SortKey::Minor => rows.sort_by(|a, b| {
            b.minor_contributors
                .cmp(&a.minor_contributors)
                .then_with(|| a.path.cmp(&b.path))
        }),
        SortKey::Path => rows.sort_by(|a, b| a.path.cmp(&b.path)),
    }
}
