//! Uniqueness finalizer: collapse a commit's candidate locations to one.
//!
//! Priority, first rule with a candidate wins:
//! 1. the main repo's default branch, outright, even if other repos' default
//!    branches are also candidates;
//! 2. any repo's default branch, smallest `(repo, branch)`;
//! 3. smallest `(repo, branch)` overall.

use crate::CommitLocation;

use super::index::{CommitId, CommitIndex};

/// Pick one location out of `candidates` by the priority rules above.
pub fn select_by_priority<'c>(
    index: &CommitIndex,
    candidates: &'c [CommitLocation],
) -> Option<&'c CommitLocation> {
    if let Some(main) = index.main_default_location() {
        if let Some(found) = candidates.iter().find(|c| **c == main) {
            return Some(found);
        }
    }
    candidates
        .iter()
        .filter(|c| index.is_default_branch(c))
        .min()
        .or_else(|| candidates.iter().min())
}

/// Reduce a commit with two or more candidates to exactly one.
/// Returns `true` if the commit was collapsed.
pub fn make_unique(index: &mut CommitIndex, id: CommitId) -> bool {
    let candidates = index.locations(id);
    if candidates.len() < 2 {
        return false;
    }
    match select_by_priority(index, candidates).cloned() {
        Some(chosen) => {
            index.assign(id, chosen);
            true
        }
        None => false,
    }
}

/// Final pass over every commit still ambiguous after merge resolution.
/// Returns how many commits were collapsed.
pub fn finalize_all(index: &mut CommitIndex) -> usize {
    (0..index.len()).filter(|&id| make_unique(index, id)).count()
}
