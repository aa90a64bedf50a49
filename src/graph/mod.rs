//! Resolution core: turns a duplicated, multi-provenance commit list into one
//! canonical commit graph.
//!
//! Pipeline, one fresh [`CommitIndex`] per run:
//! index → sanitize references → provenance walk per merge → finalize → assemble.
//!
//! ## Module isolation
//!
//! Pure, synchronous, in-memory. Nothing here performs I/O or returns an error;
//! degradations are logged through `tracing` and counted in [`ResolveReport`].

pub mod finalize;
pub mod index;
pub mod merge_base;
pub mod output;
pub mod provenance;

use std::time::Instant;

use serde::Serialize;
use tracing::info;

use crate::{Commit, DefaultBranches};

pub use index::{CommitId, CommitIndex};
pub use provenance::ProvenanceResolver;

/// Counters describing one resolution run.
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveReport {
    /// Raw records received, duplicates included.
    pub input_commits: usize,
    pub distinct_commits: usize,
    /// Distinct commits observed under more than one location.
    pub ambiguous_commits: usize,
    /// Parent references dropped because the parent was never fetched.
    pub dangling_parents: usize,
    pub merge_commits: usize,
    pub already_resolved: usize,
    pub source_by_head: usize,
    pub source_by_message: usize,
    pub source_by_priority: usize,
    pub octopus_skipped: usize,
    pub missing_merge_base: usize,
    pub pruned_locations: usize,
    /// Commits collapsed by the uniqueness finalizer (backstop and final pass).
    pub collapsed: usize,
    pub dropped_commits: usize,
    pub multi_location_commits: usize,
}

impl ResolveReport {
    /// Internal consistency violations seen by the output assembler.
    pub fn violations(&self) -> usize {
        self.dropped_commits + self.multi_location_commits
    }
}

/// Resolve a raw commit list into unique commits with corrected
/// `repo`/`branch`/`url` and parent references that all resolve.
pub fn resolve(commits: Vec<Commit>, default_branches: &DefaultBranches, main_repo: &str) -> Vec<Commit> {
    resolve_with_report(commits, default_branches, main_repo).0
}

/// [`resolve`], also returning the run's counters.
pub fn resolve_with_report(
    commits: Vec<Commit>,
    default_branches: &DefaultBranches,
    main_repo: &str,
) -> (Vec<Commit>, ResolveReport) {
    let start = Instant::now();
    let mut report = ResolveReport {
        input_commits: commits.len(),
        ..ResolveReport::default()
    };

    let mut index = CommitIndex::build(commits, default_branches, main_repo);
    report.distinct_commits = index.len();
    report.ambiguous_commits = index.ambiguous_count();
    report.dangling_parents = index.sanitize_references();

    ProvenanceResolver::new(&mut index, &mut report).run();
    report.collapsed += finalize::finalize_all(&mut index);

    let resolved = output::assemble(index, &mut report);

    info!(
        elapsed_ms = format_args!("{:.1}", start.elapsed().as_secs_f64() * 1000.0),
        input = report.input_commits,
        commits = resolved.len(),
        ambiguous = report.ambiguous_commits,
        merges = report.merge_commits,
        violations = report.violations(),
        "Commit provenance resolved"
    );
    (resolved, report)
}

// ─── Tests ───────────────────────────────────────────────────────────
