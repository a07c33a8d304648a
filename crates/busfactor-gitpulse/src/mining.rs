//! Git history extraction via git2.
//!
//! Walks commit history newest first and turns every commit into a
//! [`CommitRecord`] with per-file change types and line counts, ready to be
//! folded by [`ContributionAccumulator::record`](crate::contributors::ContributionAccumulator::record).

use std::path::Path;

use busfactor_core::{BusFactorError, ChangeType, Result};
use git2::{Delta, DiffFindOptions, DiffOptions, ErrorCode, Oid, Patch, Repository, Sort};

use crate::contributors::{CommitRecord, ModifiedFile};

/// Options for history mining.
///
/// Every bound is optional and inclusive.
///
/// # Examples
///
/// ```
/// use busfactor_gitpulse::mining::MiningOptions;
///
/// let opts = MiningOptions::default();
/// assert!(opts.since.is_none());
/// assert!(opts.branch.is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MiningOptions {
    /// Skip commits committed before this Unix timestamp.
    pub since: Option<i64>,
    /// Skip commits committed after this Unix timestamp.
    pub until: Option<i64>,
    /// Oldest commit to include; its ancestors are not walked.
    pub from_commit: Option<String>,
    /// Newest commit to include; overrides `branch`.
    pub to_commit: Option<String>,
    /// Branch to walk (default: HEAD).
    pub branch: Option<String>,
}

/// Mine commit history from a git repository.
///
/// Returns commits newest first. Merge commits are returned with no
/// modified files. A repository whose HEAD is unborn yields no commits.
/// The `since`/`until` window is applied to committer time, like
/// `git log --since`.
///
/// # Errors
///
/// Returns [`BusFactorError::Git`] if the repository cannot be opened, a
/// revision cannot be resolved, or a diff fails.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use busfactor_gitpulse::mining::{mine_history, MiningOptions};
///
/// let commits = mine_history(Path::new("."), &MiningOptions::default()).unwrap();
/// for c in &commits {
///     println!("{}: {} files ({})", c.hash, c.modified_files.len(), c.author);
/// }
/// ```
pub fn mine_history(
    repo_path: &Path,
    options: &MiningOptions,
) -> Result<Vec<CommitRecord>> {
    let repo = Repository::open(repo_path)
        .map_err(|e| BusFactorError::Git(format!("failed to open repository: {e}")))?;

    let mut revwalk = repo
        .revwalk()
        .map_err(|e| BusFactorError::Git(format!("failed to create revwalk: {e}")))?;

    revwalk
        .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
        .map_err(|e| BusFactorError::Git(format!("failed to sort revwalk: {e}")))?;

    if let Some(ref to_commit) = options.to_commit {
        let oid = resolve_commit(&repo, to_commit)?;
        revwalk
            .push(oid)
            .map_err(|e| BusFactorError::Git(format!("failed to push oid: {e}")))?;
    } else if let Some(ref branch) = options.branch {
        let reference = repo
            .resolve_reference_from_short_name(branch)
            .map_err(|e| {
                BusFactorError::Git(format!("failed to resolve branch '{branch}': {e}"))
            })?;
        let oid = reference
            .peel_to_commit()
            .map_err(|e| BusFactorError::Git(format!("branch '{branch}' has no commit: {e}")))?
            .id();
        revwalk
            .push(oid)
            .map_err(|e| BusFactorError::Git(format!("failed to push oid: {e}")))?;
    } else {
        match repo.head() {
            Ok(_) => {}
            // A freshly initialized repository has no history yet.
            Err(e) if matches!(e.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                return Ok(Vec::new());
            }
            Err(e) => return Err(BusFactorError::Git(format!("failed to read HEAD: {e}"))),
        }
        revwalk
            .push_head()
            .map_err(|e| BusFactorError::Git(format!("failed to push HEAD: {e}")))?;
    }

    if let Some(ref from_commit) = options.from_commit {
        let oid = resolve_commit(&repo, from_commit)?;
        let commit = repo
            .find_commit(oid)
            .map_err(|e| BusFactorError::Git(format!("failed to find commit: {e}")))?;
        for parent_id in commit.parent_ids() {
            revwalk
                .hide(parent_id)
                .map_err(|e| BusFactorError::Git(format!("failed to hide oid: {e}")))?;
        }
    }

    let mut commits = Vec::new();

    for oid_result in revwalk {
        let oid = oid_result.map_err(|e| BusFactorError::Git(format!("revwalk error: {e}")))?;

        let commit = repo
            .find_commit(oid)
            .map_err(|e| BusFactorError::Git(format!("failed to find commit: {e}")))?;

        let timestamp = commit.time().seconds();
        if options.since.is_some_and(|since| timestamp < since) {
            continue;
        }
        if options.until.is_some_and(|until| timestamp > until) {
            continue;
        }

        let modified_files = if commit.parent_count() > 1 {
            Vec::new()
        } else {
            extract_modified_files(&repo, &commit)?
        };

        let author = commit.author();
        let hash = oid.to_string();
        commits.push(CommitRecord {
            hash: hash[..hash.len().min(8)].to_string(),
            author: author.email().unwrap_or("unknown").to_string(),
            timestamp,
            modified_files,
        });
    }

    Ok(commits)
}

fn resolve_commit(repo: &Repository, rev: &str) -> Result<Oid> {
    let object = repo
        .revparse_single(rev)
        .map_err(|e| BusFactorError::Git(format!("failed to resolve revision '{rev}': {e}")))?;
    let commit = object
        .peel_to_commit()
        .map_err(|e| BusFactorError::Git(format!("'{rev}' is not a commit: {e}")))?;
    Ok(commit.id())
}

fn extract_modified_files(
    repo: &Repository,
    commit: &git2::Commit,
) -> Result<Vec<ModifiedFile>> {
    let commit_tree = commit
        .tree()
        .map_err(|e| BusFactorError::Git(format!("failed to get commit tree: {e}")))?;

    let parent_tree = if commit.parent_count() > 0 {
        let parent = commit
            .parent(0)
            .map_err(|e| BusFactorError::Git(format!("failed to get parent: {e}")))?;
        Some(
            parent
                .tree()
                .map_err(|e| BusFactorError::Git(format!("failed to get parent tree: {e}")))?,
        )
    } else {
        None
    };

    let mut diff_opts = DiffOptions::new();
    let mut diff = repo
        .diff_tree_to_tree(
            parent_tree.as_ref(),
            Some(&commit_tree),
            Some(&mut diff_opts),
        )
        .map_err(|e| BusFactorError::Git(format!("failed to compute diff: {e}")))?;

    let mut find_opts = DiffFindOptions::new();
    find_opts.renames(true);
    diff.find_similar(Some(&mut find_opts))
        .map_err(|e| BusFactorError::Git(format!("failed to find renames: {e}")))?;

    let mut files = Vec::new();

    for (idx, delta) in diff.deltas().enumerate() {
        let change_type = change_type_of(delta.status());

        let old_path = match change_type {
            ChangeType::Add => None,
            _ => delta.old_file().path().map(path_string),
        };
        let new_path = match change_type {
            ChangeType::Delete => None,
            _ => delta.new_file().path().map(path_string),
        };

        // Binary files have no line stats.
        let (added_lines, deleted_lines) = match Patch::from_diff(&diff, idx)
            .map_err(|e| BusFactorError::Git(format!("failed to build patch: {e}")))?
        {
            Some(patch) => {
                let (_, additions, deletions) = patch
                    .line_stats()
                    .map_err(|e| BusFactorError::Git(format!("failed to count lines: {e}")))?;
                (additions as u64, deletions as u64)
            }
            None => (0, 0),
        };

        files.push(ModifiedFile {
            old_path,
            new_path,
            change_type,
            added_lines,
            deleted_lines,
        });
    }

    Ok(files)
}

fn change_type_of(status: Delta) -> ChangeType {
    match status {
        Delta::Added => ChangeType::Add,
        Delta::Deleted => ChangeType::Delete,
        Delta::Modified => ChangeType::Modify,
        Delta::Renamed => ChangeType::Rename,
        Delta::Copied => ChangeType::Copy,
        _ => ChangeType::Unknown,
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delta_statuses_map_to_change_types() {
        assert_eq!(change_type_of(Delta::Added), ChangeType::Add);
        assert_eq!(change_type_of(Delta::Deleted), ChangeType::Delete);
        assert_eq!(change_type_of(Delta::Modified), ChangeType::Modify);
        assert_eq!(change_type_of(Delta::Renamed), ChangeType::Rename);
        assert_eq!(change_type_of(Delta::Copied), ChangeType::Copy);
        assert_eq!(change_type_of(Delta::Typechange), ChangeType::Unknown);
        assert_eq!(change_type_of(Delta::Unmodified), ChangeType::Unknown);
    }

    #[test]
    fn unborn_head_yields_no_commits() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        let commits = mine_history(dir.path(), &MiningOptions::default()).unwrap();
        assert!(commits.is_empty());
    }

    #[test]
    fn opening_a_non_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = mine_history(dir.path(), &MiningOptions::default());
        assert!(matches!(result, Err(BusFactorError::Git(_))));
    }
}
