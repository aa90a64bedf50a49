//! Merge-base search over the fetched commit DAG.
//!
//! Best-effort first common ancestor, not Git's exact merge-base: it only has
//! to be a single shared point that bounds the provenance walk.

use std::collections::{HashSet, VecDeque};

use super::index::{CommitId, CommitIndex};

/// Every commit reachable from `start` through any parent, `start` included.
///
/// Stops descending at parents missing from the index (logged by
/// [`CommitIndex::lookup`]).
pub fn collect_ancestors(index: &CommitIndex, start: CommitId) -> HashSet<CommitId> {
    let mut ancestors = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(start);

    while let Some(id) = queue.pop_front() {
        if !ancestors.insert(id) {
            continue;
        }
        for parent in &index.commit(id).parent_hashes {
            if let Some(parent_id) = index.lookup(parent) {
                if !ancestors.contains(&parent_id) {
                    queue.push_back(parent_id);
                }
            }
        }
    }

    ancestors
}

/// First commit reached breadth-first from `second` that is also an ancestor
/// of `first`. `None` when the histories are disjoint within the fetch window.
pub fn find_merge_base(index: &CommitIndex, first: CommitId, second: CommitId) -> Option<CommitId> {
    let ancestors = collect_ancestors(index, first);

    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    queue.push_back(second);

    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        if ancestors.contains(&id) {
            return Some(id);
        }
        for parent in &index.commit(id).parent_hashes {
            if let Some(parent_id) = index.lookup(parent) {
                if !visited.contains(&parent_id) {
                    queue.push_back(parent_id);
                }
            }
        }
    }

    None
}
