//! Provenance resolver: decides which `(repo, branch)` the incoming side of
//! every merge commit came from and claims that side's history for it.
//!
//! ## Per merge commit `m = [p0, p1]`
//!
//! 1. Skip if `p1` already has a single location.
//! 2. Merge-base `b` of `p0` and `p1` (may be none).
//! 3. Source location for `p1`: branch head it is the tip of, else the
//!    `Merge pull request ... from owner/branch` message, else priority
//!    fallback preferring forks over the main repo.
//! 4. Walk first parents from `p1`, assigning the source, until `b` or the
//!    end of history.
//! 5. If the walk stopped at `b`, prune the source from `b` and its
//!    first-parent ancestors, never emptying a commit's candidate set. A walk
//!    that ran out of parents has no shared history left to prune.
//!
//! Merges met during step 4 are resolved first. Nesting is an explicit frame
//! stack, and each merge is opened at most once per run.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::CommitLocation;

use super::finalize::{make_unique, select_by_priority};
use super::index::{CommitId, CommitIndex};
use super::merge_base::find_merge_base;
use super::ResolveReport;

/// GitHub's pull request merge subject: `Merge pull request #12 from owner/branch`.
/// The branch runs to the next whitespace and may itself contain `/`.
static MERGE_PULL_REQUEST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)merge pull request .*?from ([^/\s]+)/(\S+)")
        .expect("merge pull request pattern is valid")
});

/// How the source location of a merge's incoming side was chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourcePick {
    /// The incoming parent is the head of that location.
    Head,
    /// Inferred from the merge commit's message.
    Message,
    /// Priority fallback over the parent's candidates.
    Priority,
}

/// `(owner, branch)` named by a pull request merge message, if it is one.
pub fn parse_merge_message(message: &str) -> Option<(&str, &str)> {
    let caps = MERGE_PULL_REQUEST.captures(message)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Candidate named by the merge message, when its owner maps to a known repo
/// and that `(repo, branch)` is among `candidates`.
pub fn infer_source_from_message(
    index: &CommitIndex,
    message: &str,
    candidates: &[CommitLocation],
) -> Option<CommitLocation> {
    let (owner, branch) = parse_merge_message(message)?;
    let repo = index.repo_for_owner(owner)?;
    candidates
        .iter()
        .find(|c| c.repo == repo && c.branch == branch)
        .cloned()
}

/// Priority pick that prefers forks: main repo candidates only count when
/// nothing else was observed.
pub fn fallback_source(index: &CommitIndex, candidates: &[CommitLocation]) -> Option<CommitLocation> {
    let forks: Vec<CommitLocation> = candidates
        .iter()
        .filter(|c| c.repo != index.main_repo())
        .cloned()
        .collect();
    let pool = if forks.is_empty() { candidates } else { forks.as_slice() };
    select_by_priority(index, pool).cloned()
}

/// A merge whose incoming side is being walked.
struct MergeFrame {
    merge: CommitId,
    incoming: CommitId,
    source: CommitLocation,
    base: Option<CommitId>,
    cursor: Option<CommitId>,
    /// The walk stopped at `base` rather than at the end of history.
    reached_base: bool,
    visited: HashSet<CommitId>,
}

enum WalkStep {
    Continue,
    /// Resolve this nested merge before claiming it.
    Descend(CommitId),
    Finished,
}

/// Runs steps 1–5 for every merge commit of an index, in input order.
pub struct ProvenanceResolver<'a> {
    index: &'a mut CommitIndex,
    report: &'a mut ResolveReport,
    /// Merges already opened: finished, skipped, or on the frame stack.
    seen: HashSet<CommitId>,
}

impl<'a> ProvenanceResolver<'a> {
    pub fn new(index: &'a mut CommitIndex, report: &'a mut ResolveReport) -> Self {
        Self {
            index,
            report,
            seen: HashSet::new(),
        }
    }

    pub fn run(mut self) {
        let merges: Vec<CommitId> = (0..self.index.len())
            .filter(|&id| self.index.commit(id).is_merge())
            .collect();
        self.report.merge_commits = merges.len();

        for merge in merges {
            self.resolve_merge(merge);
        }
    }

    fn resolve_merge(&mut self, root: CommitId) {
        let mut stack: Vec<MergeFrame> = Vec::new();
        if let Some(frame) = self.open(root) {
            stack.push(frame);
        }

        while let Some(frame) = stack.last_mut() {
            match self.advance(frame) {
                WalkStep::Continue => {}
                WalkStep::Descend(nested) => {
                    if let Some(nested_frame) = self.open(nested) {
                        stack.push(nested_frame);
                    }
                }
                WalkStep::Finished => {
                    if let Some(done) = stack.pop() {
                        self.close(done);
                    }
                }
            }
        }
    }

    /// Steps 1–3. `None` when there is nothing to walk for this merge.
    fn open(&mut self, merge: CommitId) -> Option<MergeFrame> {
        if !self.seen.insert(merge) {
            return None;
        }

        let commit = self.index.commit(merge);
        if commit.parent_hashes.len() > 2 {
            warn!(
                hash = %commit.hash,
                parents = commit.parent_hashes.len(),
                "Octopus merge is unsupported, skipping it"
            );
            self.report.octopus_skipped += 1;
            return None;
        }
        let (Some(mainline), Some(incoming)) = (
            commit.parent_hashes.first().and_then(|p| self.index.lookup(p)),
            commit.parent_hashes.get(1).and_then(|p| self.index.lookup(p)),
        ) else {
            return None;
        };

        if self.index.locations(incoming).len() == 1 {
            debug!(merge = %self.index.commit(merge).hash, "Incoming side already resolved");
            self.report.already_resolved += 1;
            return None;
        }

        let base = find_merge_base(self.index, mainline, incoming);
        if base.is_none() {
            debug!(merge = %self.index.commit(merge).hash, "No merge-base within fetched history");
            self.report.missing_merge_base += 1;
        }

        let (source, pick) = self.identify_source(merge, incoming)?;
        match pick {
            SourcePick::Head => self.report.source_by_head += 1,
            SourcePick::Message => self.report.source_by_message += 1,
            SourcePick::Priority => self.report.source_by_priority += 1,
        }
        debug!(
            merge = %self.index.commit(merge).hash,
            incoming = %self.index.commit(incoming).hash,
            source = %source,
            pick = ?pick,
            "Resolving incoming side of merge"
        );

        Some(MergeFrame {
            merge,
            incoming,
            source,
            base,
            cursor: Some(incoming),
            reached_base: false,
            visited: HashSet::new(),
        })
    }

    fn identify_source(&self, merge: CommitId, incoming: CommitId) -> Option<(CommitLocation, SourcePick)> {
        if let Some(head) = self.index.heads_of(incoming).first() {
            return Some((head.clone(), SourcePick::Head));
        }

        let candidates = self.index.locations(incoming);
        if candidates.len() > 1 {
            let message = &self.index.commit(merge).message;
            if let Some(location) = infer_source_from_message(self.index, message, candidates) {
                return Some((location, SourcePick::Message));
            }
        }

        fallback_source(self.index, candidates).map(|location| (location, SourcePick::Priority))
    }

    /// Step 4, one commit at a time.
    fn advance(&mut self, frame: &mut MergeFrame) -> WalkStep {
        let Some(current) = frame.cursor else {
            return WalkStep::Finished;
        };
        if Some(current) == frame.base {
            frame.reached_base = true;
            frame.cursor = None;
            return WalkStep::Finished;
        }
        if self.index.commit(current).is_merge() && !self.seen.contains(&current) {
            return WalkStep::Descend(current);
        }
        // Cyclic input.
        if !frame.visited.insert(current) {
            frame.cursor = None;
            return WalkStep::Finished;
        }

        self.index.assign(current, frame.source.clone());
        frame.cursor = self.index.first_parent(current);
        WalkStep::Continue
    }

    /// Step 5 plus the finalizer backstop on the incoming parent.
    fn close(&mut self, frame: MergeFrame) {
        if let Some(base) = frame.base.filter(|_| frame.reached_base) {
            if self.index.locations(base).len() > 1 {
                self.prune_shared_history(base, &frame.source);
            }
        }
        if make_unique(self.index, frame.incoming) {
            self.report.collapsed += 1;
        }
        debug!(merge = %self.index.commit(frame.merge).hash, "Merge resolved");
    }

    fn prune_shared_history(&mut self, base: CommitId, source: &CommitLocation) {
        let mut visited = HashSet::new();
        let mut cursor = Some(base);
        while let Some(current) = cursor {
            if !visited.insert(current) {
                break;
            }
            if self.index.remove_location(current, source) {
                self.report.pruned_locations += 1;
            }
            cursor = self.index.first_parent(current);
        }
    }
}
