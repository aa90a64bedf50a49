//! # forkgraph: canonical commit graph across forks
//!
//! Commits fetched from a repository and its forks arrive tagged with the
//! `(repo, branch)` they were fetched under, and because forks share history the
//! same hash shows up under several tags. [`resolve`] collapses them into one
//! commit per hash, each attributed to the single location that best matches
//! the branching/merging topology, with every parent reference resolvable.
//!
//! ## Library usage
//!
//! ```
//! use forkgraph::{resolve, Commit, DefaultBranches};
//!
//! let mut defaults = DefaultBranches::new();
//! defaults.insert("me/app".to_string(), "main".to_string());
//!
//! let commits = vec![
//!     Commit::new("a1", vec![], "me/app", "main"),
//!     Commit::new("a1", vec![], "fork/app", "main"),
//! ];
//! let resolved = resolve(commits, &defaults, "me/app");
//! assert_eq!(resolved.len(), 1);
//! assert_eq!(resolved[0].repo, "me/app");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod error;
pub mod graph;
pub mod snapshot;

pub use error::ForkGraphError;
pub use graph::{resolve, resolve_with_report, ResolveReport};
pub use snapshot::{check_invariants, load_commits, load_input, write_commits, InvariantReport, ResolveInput};

/// Repository full name (`owner/name`) → its default branch.
pub type DefaultBranches = BTreeMap<String, String>;

// ─── Core public types ───────────────────────────────────────────────

/// A single commit as fetched under one `(repo, branch)` provenance tag.
///
/// The same `hash` may appear many times in an input list, once per tag.
/// After resolution every hash appears once and `repo`/`branch`/`url`
/// describe its resolved location.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Commit {
    pub hash: String,
    /// Forge-specific identifier (node id), carried through untouched.
    #[serde(default)]
    pub id: String,
    /// Parent hashes in VCS order; the first parent is the mainline.
    #[serde(default, alias = "parents")]
    pub parent_hashes: Vec<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub login: String,
    /// Commit date in seconds since epoch, `None` when the forge did not report one.
    #[serde(default, alias = "date")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub message: String,
    pub repo: String,
    pub branch: String,
}

impl Commit {
    /// Minimal commit with the given parents and provenance tag.
    pub fn new(
        hash: impl Into<String>,
        parent_hashes: Vec<String>,
        repo: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            hash: hash.into(),
            parent_hashes,
            repo: repo.into(),
            branch: branch.into(),
            ..Self::default()
        }
    }

    /// The provenance tag this record was fetched under.
    pub fn location(&self) -> CommitLocation {
        CommitLocation::new(self.repo.clone(), self.branch.clone())
    }

    /// Two or more parents.
    pub fn is_merge(&self) -> bool {
        self.parent_hashes.len() >= 2
    }
}

/// A `(repo, branch)` pair. Compared structurally; the derived ordering
/// (repo first, then branch) is the deterministic tie-break used everywhere.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitLocation {
    pub repo: String,
    pub branch: String,
}

impl CommitLocation {
    pub fn new(repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            repo: repo.into(),
            branch: branch.into(),
        }
    }

    /// Owner segment of an `owner/name` repo, `None` for names without a `/`.
    pub fn owner(&self) -> Option<&str> {
        self.repo.split_once('/').map(|(owner, _)| owner)
    }
}

impl fmt::Display for CommitLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repo, self.branch)
    }
}


// ─── Property-based tests (proptest) ─────────────────────────────────

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;
    use proptest::sample::Index;
    use std::collections::{HashMap, HashSet};

    const MAIN_REPO: &str = "me/app";

    /// Small pool so hashes collide across tags often.
    fn location_pool() -> Vec<CommitLocation> {
        vec![
            CommitLocation::new("me/app", "main"),
            CommitLocation::new("me/app", "dev"),
            CommitLocation::new("alice/app", "main"),
            CommitLocation::new("alice/app", "feature"),
            CommitLocation::new("bob/app", "topic"),
        ]
    }

    fn defaults() -> DefaultBranches {
        let mut d = DefaultBranches::new();
        d.insert("me/app".to_string(), "main".to_string());
        d.insert("alice/app".to_string(), "main".to_string());
        d.insert("bob/app".to_string(), "main".to_string());
        d
    }

    /// One generated commit: parent picks among earlier commits, tag indices,
    /// optional date, and whether to reference a parent outside the fetch window.
    type CommitShape = (Vec<Index>, Vec<usize>, Option<i64>, bool);

    fn arb_history() -> impl Strategy<Value = Vec<CommitShape>> {
        proptest::collection::vec(
            (
                proptest::collection::vec(any::<Index>(), 0..4),
                proptest::collection::vec(0usize..5, 1..4),
                proptest::option::of(0i64..50),
                proptest::bool::weighted(0.1),
            ),
            1..30,
        )
    }

    /// Expand shapes into a raw, duplicated commit list. `reverse_tags` flips
    /// the order in which each hash's provenance tags are appended.
    fn expand(shapes: &[CommitShape], reverse_tags: bool) -> Vec<Commit> {
        let pool = location_pool();
        let mut raw = Vec::new();
        for (i, (parent_picks, tags, timestamp, dangling)) in shapes.iter().enumerate() {
            let mut parents: Vec<String> = Vec::new();
            if i > 0 {
                for pick in parent_picks {
                    let p = format!("c{}", pick.index(i));
                    if !parents.contains(&p) {
                        parents.push(p);
                    }
                }
            }
            if *dangling {
                parents.push(format!("outside{}", i));
            }

            let mut tags: Vec<usize> = tags.clone();
            tags.dedup();
            if reverse_tags {
                tags.reverse();
            }
            for t in tags {
                let loc = &pool[t];
                let mut commit = Commit::new(format!("c{}", i), parents.clone(), loc.repo.clone(), loc.branch.clone());
                commit.timestamp = *timestamp;
                commit.url = format!("https://github.com/{}/commit/c{}", loc.repo, i);
                raw.push(commit);
            }
        }
        raw
    }

    fn assignment(output: &[Commit]) -> HashMap<String, CommitLocation> {
        output.iter().map(|c| (c.hash.clone(), c.location())).collect()
    }

    proptest! {
        /// Output never has more commits than the input has distinct hashes.
        #[test]
        fn resolve_cardinality_non_increase(shapes in arb_history()) {
            let raw = expand(&shapes, false);
            let distinct: HashSet<String> = raw.iter().map(|c| c.hash.clone()).collect();
            let output = resolve(raw, &defaults(), MAIN_REPO);
            prop_assert!(output.len() <= distinct.len());
        }

        /// Every input hash appears exactly once, nothing else appears, and
        /// every parent reference resolves inside the output.
        #[test]
        fn resolve_structural_invariants(shapes in arb_history()) {
            let raw = expand(&shapes, false);
            let output = resolve(raw.clone(), &defaults(), MAIN_REPO);
            let report = check_invariants(&raw, &output);
            prop_assert!(report.is_clean(), "violations: {:?}", report);
        }

        /// Resolution never invents a location: each one it assigns was
        /// observed for some commit of the input.
        #[test]
        fn resolve_assigns_only_known_locations(shapes in arb_history()) {
            let raw = expand(&shapes, false);
            let observed: HashSet<CommitLocation> = raw.iter().map(Commit::location).collect();
            let output = resolve(raw, &defaults(), MAIN_REPO);
            for c in &output {
                prop_assert!(observed.contains(&c.location()),
                    "{} resolved to unknown {}", c.hash, c.location());
            }
        }

        /// The order in which duplicate tags were appended does not change the result.
        #[test]
        fn resolve_idempotent_under_retagging(shapes in arb_history()) {
            let forward = resolve(expand(&shapes, false), &defaults(), MAIN_REPO);
            let reversed = resolve(expand(&shapes, true), &defaults(), MAIN_REPO);
            prop_assert_eq!(assignment(&forward), assignment(&reversed));
        }

        /// Resolving an already resolved list changes nothing.
        #[test]
        fn resolve_is_stable_on_its_output(shapes in arb_history()) {
            let once = resolve(expand(&shapes, false), &defaults(), MAIN_REPO);
            let twice = resolve(once.clone(), &defaults(), MAIN_REPO);
            prop_assert_eq!(once, twice);
        }

        /// Commit URLs always point at the resolved repo.
        #[test]
        fn resolve_rewrites_urls(shapes in arb_history()) {
            let output = resolve(expand(&shapes, false), &defaults(), MAIN_REPO);
            for c in &output {
                let expected = format!("https://github.com/{}/commit/{}", c.repo, c.hash);
                prop_assert_eq!(&c.url, &expected);
            }
        }
    }
}
