//! Rename-aware accumulation of per-file, per-author line contributions.
//!
//! Every modified-file record is resolved to the logical path the file
//! carries at the newest point of the walk, so edits made under an older
//! name are credited to the same file as edits made under the current one.
//! Records must arrive newest commit first: a rename has to be seen before
//! the older commits that still used the old name.

use std::collections::{BTreeMap, HashMap};

use busfactor_core::ChangeType;

/// One commit as delivered by the history miner.
///
/// # Examples
///
/// ```
/// use busfactor_gitpulse::contributors::CommitRecord;
///
/// let commit = CommitRecord {
///     hash: "abc123".into(),
///     author: "alice@example.com".into(),
///     timestamp: 1700000000,
///     modified_files: vec![],
/// };
/// assert_eq!(commit.author, "alice@example.com");
/// ```
#[derive(Debug, Clone)]
pub struct CommitRecord {
    /// Commit hash (may be abbreviated).
    pub hash: String,
    /// Author identity, normally the author email.
    pub author: String,
    /// Unix timestamp of the commit.
    pub timestamp: i64,
    /// Files touched by this commit, at most one record per file.
    pub modified_files: Vec<ModifiedFile>,
}

/// A single file touched by a commit.
///
/// # Examples
///
/// ```
/// use busfactor_core::ChangeType;
/// use busfactor_gitpulse::contributors::ModifiedFile;
///
/// let file = ModifiedFile::modify("src/lib.rs", 10, 3);
/// assert_eq!(file.change_type, ChangeType::Modify);
/// assert_eq!(file.lines_authored(), 13);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifiedFile {
    /// Path before the change; `None` for additions.
    pub old_path: Option<String>,
    /// Path after the change; `None` for deletions.
    pub new_path: Option<String>,
    /// How the file was changed.
    pub change_type: ChangeType,
    /// Lines added by this change.
    pub added_lines: u64,
    /// Lines deleted by this change.
    pub deleted_lines: u64,
}

impl ModifiedFile {
    /// A newly created file.
    pub fn add(path: &str, added_lines: u64) -> Self {
        Self {
            old_path: None,
            new_path: Some(path.to_string()),
            change_type: ChangeType::Add,
            added_lines,
            deleted_lines: 0,
        }
    }

    /// An in-place edit.
    pub fn modify(path: &str, added_lines: u64, deleted_lines: u64) -> Self {
        Self {
            old_path: Some(path.to_string()),
            new_path: Some(path.to_string()),
            change_type: ChangeType::Modify,
            added_lines,
            deleted_lines,
        }
    }

    /// A move from `from` to `to`, optionally with edits.
    pub fn rename(from: &str, to: &str, added_lines: u64, deleted_lines: u64) -> Self {
        Self {
            old_path: Some(from.to_string()),
            new_path: Some(to.to_string()),
            change_type: ChangeType::Rename,
            added_lines,
            deleted_lines,
        }
    }

    /// A removed file.
    pub fn delete(path: &str, deleted_lines: u64) -> Self {
        Self {
            old_path: Some(path.to_string()),
            new_path: None,
            change_type: ChangeType::Delete,
            added_lines: 0,
            deleted_lines,
        }
    }

    /// `added_lines + deleted_lines`.
    pub fn lines_authored(&self) -> u64 {
        self.added_lines + self.deleted_lines
    }
}

/// Maps historical paths to the logical path they resolve to.
///
/// Targets are stored already resolved, so a lookup is a single step even
/// across chains of renames.
///
/// # Examples
///
/// ```
/// use busfactor_gitpulse::contributors::RenameAliasTable;
///
/// let mut aliases = RenameAliasTable::default();
/// aliases.alias("old.rs", "new.rs");
/// assert_eq!(aliases.resolve("old.rs"), "new.rs");
/// assert_eq!(aliases.resolve("other.rs"), "other.rs");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RenameAliasTable {
    aliases: HashMap<String, String>,
}

impl RenameAliasTable {
    /// Resolve `path` to its logical path, or return it unchanged.
    pub fn resolve<'a>(&'a self, path: &'a str) -> &'a str {
        self.aliases.get(path).map_or(path, String::as_str)
    }

    /// Record that `old_path` now resolves to `canonical`.
    pub fn alias(&mut self, old_path: &str, canonical: &str) {
        self.aliases
            .insert(old_path.to_string(), canonical.to_string());
    }

    /// Number of recorded aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Whether no rename has been recorded.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// Logical path → author → cumulative lines authored.
///
/// Paths iterate in sorted order; author order within a file is
/// unspecified.
///
/// # Examples
///
/// ```
/// use busfactor_gitpulse::contributors::ContributionTable;
///
/// let mut table = ContributionTable::default();
/// table.add("main.rs", "alice", 10);
/// table.add("main.rs", "alice", 5);
/// table.add("main.rs", "bob", 1);
/// assert_eq!(table.get("main.rs", "alice"), Some(15));
/// assert_eq!(table.total("main.rs"), 16);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContributionTable {
    files: BTreeMap<String, HashMap<String, u64>>,
}

impl ContributionTable {
    /// Get the counter for `(path, author)`, inserting zero if absent.
    pub fn entry_mut(&mut self, path: &str, author: &str) -> &mut u64 {
        self.files
            .entry(path.to_string())
            .or_default()
            .entry(author.to_string())
            .or_default()
    }

    /// Add `lines` to the counter for `(path, author)`.
    pub fn add(&mut self, path: &str, author: &str, lines: u64) {
        *self.entry_mut(path, author) += lines;
    }

    /// Lines credited to `author` on `path`, if the pair was ever recorded.
    pub fn get(&self, path: &str, author: &str) -> Option<u64> {
        self.files.get(path)?.get(author).copied()
    }

    /// Per-author totals for `path`.
    pub fn authors(&self, path: &str) -> Option<&HashMap<String, u64>> {
        self.files.get(path)
    }

    /// Sum of all contributions to `path` (zero if unknown).
    pub fn total(&self, path: &str) -> u64 {
        self.files
            .get(path)
            .map_or(0, |authors| authors.values().sum())
    }

    /// Iterate `(path, per-author totals)` in path order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &HashMap<String, u64>)> {
        self.files
            .iter()
            .map(|(path, authors)| (path.as_str(), authors))
    }

    /// Number of logical paths recorded.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Builds a [`ContributionTable`] from a commit stream.
///
/// Owns the alias table and contribution table for one traversal; nothing
/// is shared between instances.
///
/// # Examples
///
/// ```
/// use busfactor_gitpulse::contributors::{CommitRecord, ContributionAccumulator, ModifiedFile};
///
/// // Oldest first: alice adds a.py, bob renames it, carol edits b.py.
/// let history = vec![
///     CommitRecord {
///         hash: "1".into(),
///         author: "alice@example.com".into(),
///         timestamp: 1,
///         modified_files: vec![ModifiedFile::add("a.py", 10)],
///     },
///     CommitRecord {
///         hash: "2".into(),
///         author: "bob@example.com".into(),
///         timestamp: 2,
///         modified_files: vec![ModifiedFile::rename("a.py", "b.py", 0, 0)],
///     },
///     CommitRecord {
///         hash: "3".into(),
///         author: "carol@example.com".into(),
///         timestamp: 3,
///         modified_files: vec![ModifiedFile::modify("b.py", 5, 0)],
///     },
/// ];
///
/// let table = ContributionAccumulator::from_chronological(&history).finish();
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.get("b.py", "alice@example.com"), Some(10));
/// assert_eq!(table.get("b.py", "carol@example.com"), Some(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContributionAccumulator {
    aliases: RenameAliasTable,
    table: ContributionTable,
    unattributed_lines: u64,
    commits_seen: usize,
}

impl ContributionAccumulator {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate a stream delivered newest commit first.
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a CommitRecord>,
    {
        let mut acc = Self::new();
        for commit in records {
            acc.record(commit);
        }
        acc
    }

    /// Accumulate a stream delivered oldest commit first.
    pub fn from_chronological(commits: &[CommitRecord]) -> Self {
        Self::from_records(commits.iter().rev())
    }

    /// Fold one commit into the tables.
    pub fn record(&mut self, commit: &CommitRecord) {
        self.commits_seen += 1;
        let author = commit.author.trim();

        for file in &commit.modified_files {
            let Some(new_path) = file.new_path.as_deref() else {
                self.unattributed_lines += file.lines_authored();
                continue;
            };

            let canonical = self.aliases.resolve(new_path).to_string();

            if file.change_type == ChangeType::Rename {
                if let Some(old_path) = file.old_path.as_deref() {
                    self.aliases.alias(old_path, &canonical);
                }
            }

            self.table.add(&canonical, author, file.lines_authored());
        }
    }

    /// Aliases recorded so far.
    pub fn aliases(&self) -> &RenameAliasTable {
        &self.aliases
    }

    /// Contributions recorded so far.
    pub fn table(&self) -> &ContributionTable {
        &self.table
    }

    /// Lines from records with no `new_path`; these are never reported.
    pub fn unattributed_lines(&self) -> u64 {
        self.unattributed_lines
    }

    /// Number of commits folded in.
    pub fn commits_seen(&self) -> usize {
        self.commits_seen
    }

    /// Consume the accumulator, yielding the finished table.
    pub fn finish(self) -> ContributionTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn commit(author: &str, files: Vec<ModifiedFile>) -> CommitRecord {
        CommitRecord {
            hash: "abc".into(),
            author: author.into(),
            timestamp: 1000,
            modified_files: files,
        }
    }

    #[test]
    fn single_rename_collapses_to_new_name() {
        let history = vec![
            commit("x", vec![ModifiedFile::add("a.py", 10)]),
            commit("x", vec![ModifiedFile::rename("a.py", "b.py", 0, 0)]),
            commit("y", vec![ModifiedFile::modify("b.py", 5, 0)]),
        ];

        let table = ContributionAccumulator::from_chronological(&history).finish();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("b.py", "x"), Some(10));
        assert_eq!(table.get("b.py", "y"), Some(5));
        assert!(table.authors("a.py").is_none());
    }

    #[test]
    fn chained_renames_resolve_to_latest_name() {
        let history = vec![
            commit("x", vec![ModifiedFile::add("a.rs", 4)]),
            commit("y", vec![ModifiedFile::rename("a.rs", "b.rs", 1, 1)]),
            commit("z", vec![ModifiedFile::modify("b.rs", 3, 0)]),
            commit("x", vec![ModifiedFile::rename("b.rs", "c.rs", 0, 0)]),
            commit("w", vec![ModifiedFile::modify("c.rs", 7, 2)]),
        ];

        let acc = ContributionAccumulator::from_chronological(&history);
        assert_eq!(acc.aliases().resolve("a.rs"), "c.rs");
        assert_eq!(acc.aliases().resolve("b.rs"), "c.rs");

        let table = acc.finish();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("c.rs", "x"), Some(4));
        assert_eq!(table.get("c.rs", "y"), Some(2));
        assert_eq!(table.get("c.rs", "z"), Some(3));
        assert_eq!(table.get("c.rs", "w"), Some(9));
        assert_eq!(table.total("c.rs"), 18);
    }

    #[test]
    fn records_are_processed_in_delivery_order() {
        // Newest first, as the miner delivers them.
        let newest_first = [
            commit("y", vec![ModifiedFile::modify("b.py", 5, 0)]),
            commit("x", vec![ModifiedFile::rename("a.py", "b.py", 0, 0)]),
            commit("x", vec![ModifiedFile::add("a.py", 10)]),
        ];
        let table = ContributionAccumulator::from_records(&newest_first).finish();
        assert_eq!(table.get("b.py", "x"), Some(10));

        // Delivered oldest first, the rename comes too late to redirect a.py.
        let oldest_first: Vec<_> = newest_first.iter().rev().collect();
        let table = ContributionAccumulator::from_records(oldest_first).finish();
        assert_eq!(table.get("a.py", "x"), Some(10));
        assert_eq!(table.get("b.py", "y"), Some(5));
    }

    #[test]
    fn only_renames_create_aliases() {
        let copy = ModifiedFile {
            old_path: Some("a.py".into()),
            new_path: Some("b.py".into()),
            change_type: ChangeType::Copy,
            added_lines: 3,
            deleted_lines: 0,
        };
        let unknown = ModifiedFile {
            old_path: Some("link".into()),
            new_path: Some("target".into()),
            change_type: ChangeType::Unknown,
            added_lines: 1,
            deleted_lines: 1,
        };
        let history = vec![
            commit("x", vec![ModifiedFile::add("a.py", 10)]),
            commit("y", vec![copy]),
            commit("z", vec![unknown]),
            commit("x", vec![ModifiedFile::modify("link", 4, 0)]),
        ];

        let acc = ContributionAccumulator::from_chronological(&history);
        assert!(acc.aliases().is_empty());
        assert_eq!(acc.aliases().resolve("a.py"), "a.py");

        let table = acc.finish();
        assert_eq!(table.get("a.py", "x"), Some(10));
        assert_eq!(table.get("a.py", "y"), None);
        assert_eq!(table.get("b.py", "y"), Some(3));
        assert_eq!(table.get("target", "z"), Some(2));
        assert_eq!(table.get("link", "x"), Some(4));
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn rename_of_unknown_path_is_benign() {
        let history = vec![commit(
            "x",
            vec![ModifiedFile::rename("vendored/lib.rs", "src/lib.rs", 2, 0)],
        )];
        let acc = ContributionAccumulator::from_chronological(&history);
        assert_eq!(acc.aliases().resolve("vendored/lib.rs"), "src/lib.rs");

        let table = acc.finish();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("src/lib.rs", "x"), Some(2));
    }

    #[test]
    fn deletions_without_new_path_are_unattributed() {
        let history = vec![
            commit("x", vec![ModifiedFile::add("gone.rs", 8)]),
            commit("y", vec![ModifiedFile::delete("gone.rs", 8)]),
        ];
        let acc = ContributionAccumulator::from_chronological(&history);
        assert_eq!(acc.unattributed_lines(), 8);
        assert_eq!(acc.commits_seen(), 2);

        let table = acc.finish();
        assert_eq!(table.get("gone.rs", "x"), Some(8));
        assert_eq!(table.get("gone.rs", "y"), None);
    }

    #[test]
    fn author_is_trimmed_but_not_normalized() {
        let history = vec![
            commit("  alice@example.com \n", vec![ModifiedFile::add("f", 1)]),
            commit("Alice@Example.com", vec![ModifiedFile::modify("f", 1, 0)]),
        ];
        let table = ContributionAccumulator::from_chronological(&history).finish();
        let authors = table.authors("f").unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors["alice@example.com"], 1);
        assert_eq!(authors["Alice@Example.com"], 1);
    }

    #[test]
    fn zero_line_changes_still_create_entries() {
        let history = vec![commit("x", vec![ModifiedFile::modify("empty.txt", 0, 0)])];
        let table = ContributionAccumulator::from_chronological(&history).finish();
        assert_eq!(table.get("empty.txt", "x"), Some(0));
        assert_eq!(table.total("empty.txt"), 0);
    }

    #[test]
    fn entry_mut_inserts_default() {
        let mut table = ContributionTable::default();
        assert!(table.is_empty());
        *table.entry_mut("a", "x") += 3;
        *table.entry_mut("a", "x") += 4;
        assert_eq!(table.get("a", "x"), Some(7));
        assert_eq!(table.get("a", "y"), None);
        assert_eq!(table.total("missing"), 0);
    }

    #[test]
    fn table_iterates_paths_in_order() {
        let mut table = ContributionTable::default();
        table.add("zeta.rs", "x", 1);
        table.add("alpha.rs", "x", 1);
        table.add("mid.rs", "x", 1);
        let paths: Vec<&str> = table.iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["alpha.rs", "mid.rs", "zeta.rs"]);
    }
}
