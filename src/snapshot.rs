//! JSON snapshots in and out of the resolver, plus the structural checks a
//! resolved commit list must pass.
//!
//! A snapshot is what the data retrieval side hands over:
//!
//! ```json
//! {
//!   "main_repo": "me/app",
//!   "default_branches": { "me/app": "main", "alice/app": "main" },
//!   "commits": [ { "hash": "...", "parents": ["..."], "repo": "me/app", "branch": "main" } ]
//! }
//! ```

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::graph::CommitIndex;
use crate::{Commit, DefaultBranches, ForkGraphError};

// ─── Input / output documents ───────────────────────────────────────

/// One resolution run's input document.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ResolveInput {
    pub main_repo: String,
    #[serde(default)]
    pub default_branches: DefaultBranches,
    pub commits: Vec<Commit>,
}

fn invalid(path: &Path, message: impl Into<String>) -> ForkGraphError {
    ForkGraphError::InvalidInput {
        path: path.display().to_string(),
        message: message.into(),
    }
}

/// Load and validate a snapshot document.
pub fn load_input(path: &Path) -> Result<ResolveInput, ForkGraphError> {
    let data = fs::read_to_string(path)?;
    let input: ResolveInput = serde_json::from_str(&data)?;

    if input.main_repo.trim().is_empty() {
        return Err(invalid(path, "main_repo is empty"));
    }
    if let Some(pos) = input.commits.iter().position(|c| c.hash.trim().is_empty()) {
        return Err(invalid(path, format!("commit #{} has an empty hash", pos)));
    }
    if let Some(c) = input.commits.iter().find(|c| c.repo.is_empty() || c.branch.is_empty()) {
        return Err(invalid(path, format!("commit {} has no repo/branch tag", c.hash)));
    }
    Ok(input)
}

/// Load a bare JSON array of commits (a resolved list written by [`write_commits`]).
pub fn load_commits(path: &Path) -> Result<Vec<Commit>, ForkGraphError> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// Write commits as a JSON array.
pub fn write_commits(mut writer: impl Write, commits: &[Commit], pretty: bool) -> Result<(), ForkGraphError> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, commits)?;
    } else {
        serde_json::to_writer(&mut writer, commits)?;
    }
    writeln!(writer)?;
    Ok(())
}

// ─── Invariant checks ───────────────────────────────────────────────

/// Every structural violation found in a resolved commit list.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct InvariantReport {
    /// Hashes emitted more than once.
    pub duplicate_hashes: Vec<String>,
    /// `(commit, parent)` pairs whose parent is not in the output.
    pub dangling_parents: Vec<(String, String)>,
    /// Output hashes that never appeared in the input.
    pub unknown_hashes: Vec<String>,
    /// Input hashes missing from the output.
    pub missing_hashes: Vec<String>,
}

impl InvariantReport {
    pub fn is_clean(&self) -> bool {
        self.violation_count() == 0
    }

    pub fn violation_count(&self) -> usize {
        self.duplicate_hashes.len()
            + self.dangling_parents.len()
            + self.unknown_hashes.len()
            + self.missing_hashes.len()
    }
}

/// Check `output` against the raw `input` it was resolved from.
///
/// Lists are sorted so reports compare equal regardless of traversal order.
pub fn check_invariants(input: &[Commit], output: &[Commit]) -> InvariantReport {
    let input_hashes: HashSet<&str> = input.iter().map(|c| c.hash.as_str()).collect();
    let mut output_hashes: HashSet<&str> = HashSet::new();
    let mut duplicates: BTreeSet<String> = BTreeSet::new();

    for commit in output {
        if !output_hashes.insert(commit.hash.as_str()) {
            duplicates.insert(commit.hash.clone());
        }
    }

    let mut report = InvariantReport {
        duplicate_hashes: duplicates.into_iter().collect(),
        ..InvariantReport::default()
    };

    for commit in output {
        for parent in &commit.parent_hashes {
            if !output_hashes.contains(parent.as_str()) {
                report.dangling_parents.push((commit.hash.clone(), parent.clone()));
            }
        }
    }
    report.unknown_hashes = output_hashes
        .difference(&input_hashes)
        .map(|h| h.to_string())
        .collect();
    report.missing_hashes = input_hashes
        .difference(&output_hashes)
        .map(|h| h.to_string())
        .collect();

    report.dangling_parents.sort();
    report.unknown_hashes.sort();
    report.missing_hashes.sort();
    report
}

// ─── Snapshot statistics ────────────────────────────────────────────

/// Duplication profile of a snapshot before resolution.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotStats {
    pub observations: usize,
    pub distinct_commits: usize,
    pub ambiguous_commits: usize,
    pub merge_commits: usize,
    pub octopus_merges: usize,
    pub repos: usize,
    pub locations: usize,
    /// Locations with a dated head commit.
    pub heads: usize,
}

pub fn snapshot_stats(input: &ResolveInput) -> SnapshotStats {
    let repos: BTreeSet<&str> = input.commits.iter().map(|c| c.repo.as_str()).collect();
    let locations: BTreeSet<(&str, &str)> = input
        .commits
        .iter()
        .map(|c| (c.repo.as_str(), c.branch.as_str()))
        .collect();

    let index = CommitIndex::build(input.commits.clone(), &input.default_branches, &input.main_repo);
    let parent_counts: Vec<usize> = (0..index.len())
        .map(|id| index.commit(id).parent_hashes.len())
        .collect();

    SnapshotStats {
        observations: index.observations(),
        distinct_commits: index.len(),
        ambiguous_commits: index.ambiguous_count(),
        merge_commits: parent_counts.iter().filter(|&&n| n >= 2).count(),
        octopus_merges: parent_counts.iter().filter(|&&n| n > 2).count(),
        repos: repos.len(),
        locations: locations.len(),
        heads: index.head_count(),
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
