//! Commit index: every lookup structure one resolution run needs.
//!
//! Canonical commit records live in an arena (`Vec<Commit>`) in first-seen
//! order; the index into that vec is the [`CommitId`] used by all other maps.
//! Location sets, heads and the reverse head index hold ids, never a second
//! copy of a commit.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{Commit, CommitLocation, DefaultBranches};

/// Arena slot of a distinct commit hash within one run.
pub type CommitId = usize;

/// Lookup structures built from the raw, duplicated commit list.
///
/// Built fresh by [`CommitIndex::build`] for every run and consumed by the
/// output assembler at the end; never shared between runs.
#[derive(Debug)]
pub struct CommitIndex {
    /// Canonical record per distinct hash. Index into this vec = commit ID.
    commits: Vec<Commit>,
    ids: HashMap<String, CommitId>,
    /// commit ID → every `(repo, branch)` it was observed under, insertion order, no duplicates.
    locations: Vec<Vec<CommitLocation>>,
    /// Latest-dated commit per location, with its date.
    heads: HashMap<CommitLocation, (CommitId, i64)>,
    /// Reverse of `heads`, each list sorted by [`CommitIndex::priority_cmp`].
    heads_by_commit: HashMap<CommitId, Vec<CommitLocation>>,
    owner_to_repo: HashMap<String, String>,
    default_branches: DefaultBranches,
    main_repo: String,
    observations: usize,
}

impl CommitIndex {
    /// Index a raw commit list. Deterministic for a given input order.
    pub fn build(raw: Vec<Commit>, default_branches: &DefaultBranches, main_repo: &str) -> Self {
        let mut index = Self {
            commits: Vec::new(),
            ids: HashMap::new(),
            locations: Vec::new(),
            heads: HashMap::new(),
            heads_by_commit: HashMap::new(),
            owner_to_repo: HashMap::new(),
            default_branches: default_branches.clone(),
            main_repo: main_repo.to_string(),
            observations: 0,
        };

        for commit in raw {
            index.observe(commit);
        }
        index.invert_heads();

        debug!(
            observations = index.observations,
            commits = index.commits.len(),
            ambiguous = index.ambiguous_count(),
            heads = index.heads.len(),
            "Commit index built"
        );
        index
    }

    fn observe(&mut self, commit: Commit) {
        self.observations += 1;
        let location = commit.location();
        let timestamp = commit.timestamp;

        if let Some(owner) = location.owner() {
            // Several repos under one owner: keep the smallest name so the map
            // does not depend on input order.
            let keep_existing = self
                .owner_to_repo
                .get(owner)
                .is_some_and(|existing| *existing <= location.repo);
            if !keep_existing {
                self.owner_to_repo.insert(owner.to_string(), location.repo.clone());
            }
        }

        let id = match self.ids.get(&commit.hash) {
            Some(&id) => {
                self.commits[id] = commit;
                id
            }
            None => {
                let id = self.commits.len();
                self.ids.insert(commit.hash.clone(), id);
                self.commits.push(commit);
                self.locations.push(Vec::new());
                id
            }
        };

        if !self.locations[id].contains(&location) {
            self.locations[id].push(location.clone());
        }

        // Unknown dates never become heads; equal dates keep the first one seen.
        if let Some(ts) = timestamp {
            let newer = self.heads.get(&location).is_none_or(|&(_, current)| ts > current);
            if newer {
                self.heads.insert(location, (id, ts));
            }
        }
    }

    fn invert_heads(&mut self) {
        let mut heads_by_commit: HashMap<CommitId, Vec<CommitLocation>> = HashMap::new();
        for (location, &(id, _)) in &self.heads {
            heads_by_commit.entry(id).or_default().push(location.clone());
        }
        for list in heads_by_commit.values_mut() {
            list.sort_by(|a, b| self.priority_cmp(a, b));
        }
        self.heads_by_commit = heads_by_commit;
    }

    // ─── Lookups ────────────────────────────────────────────────────

    /// Number of distinct commits.
    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }

    /// Number of raw records indexed, duplicates included.
    pub fn observations(&self) -> usize {
        self.observations
    }

    pub fn commit(&self, id: CommitId) -> &Commit {
        &self.commits[id]
    }

    /// Arena slot for a hash, `None` if it was never fetched.
    pub fn id_of(&self, hash: &str) -> Option<CommitId> {
        self.ids.get(hash).copied()
    }

    /// Like [`id_of`](Self::id_of) but used mid-traversal, where a miss is a
    /// data-quality signal worth logging.
    pub fn lookup(&self, hash: &str) -> Option<CommitId> {
        let id = self.id_of(hash);
        if id.is_none() {
            warn!(hash = %hash, "Commit referenced during traversal is missing from the fetched set");
        }
        id
    }

    /// First parent of `id`, resolved through [`lookup`](Self::lookup).
    pub fn first_parent(&self, id: CommitId) -> Option<CommitId> {
        self.commits[id]
            .parent_hashes
            .first()
            .and_then(|parent| self.lookup(parent))
    }

    /// Current candidate locations of a commit.
    pub fn locations(&self, id: CommitId) -> &[CommitLocation] {
        &self.locations[id]
    }

    /// Locations this commit is the head of, highest priority first.
    pub fn heads_of(&self, id: CommitId) -> &[CommitLocation] {
        self.heads_by_commit.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Head commit of a location, if any dated commit was observed on it.
    pub fn head_of(&self, location: &CommitLocation) -> Option<CommitId> {
        self.heads.get(location).map(|&(id, _)| id)
    }

    /// Number of locations that have a head.
    pub fn head_count(&self) -> usize {
        self.heads.len()
    }

    /// Repo owned by `owner`, as derived from the observed repo names.
    pub fn repo_for_owner(&self, owner: &str) -> Option<&str> {
        self.owner_to_repo.get(owner).map(String::as_str)
    }

    pub fn main_repo(&self) -> &str {
        &self.main_repo
    }

    pub fn default_branch(&self, repo: &str) -> Option<&str> {
        self.default_branches.get(repo).map(String::as_str)
    }

    /// `(main_repo, its default branch)`, if the main repo's default branch is known.
    pub fn main_default_location(&self) -> Option<CommitLocation> {
        self.default_branch(&self.main_repo)
            .map(|branch| CommitLocation::new(self.main_repo.clone(), branch))
    }

    /// Whether `location.branch` is its repo's recorded default branch.
    pub fn is_default_branch(&self, location: &CommitLocation) -> bool {
        self.default_branch(&location.repo) == Some(location.branch.as_str())
    }

    /// Commits still observed under more than one location.
    pub fn ambiguous_count(&self) -> usize {
        self.locations.iter().filter(|l| l.len() > 1).count()
    }

    /// Trust order between locations: main repo's default branch, then any
    /// default branch, then the rest; ties broken by `(repo, branch)`.
    pub fn priority_cmp(&self, a: &CommitLocation, b: &CommitLocation) -> Ordering {
        self.priority_rank(a)
            .cmp(&self.priority_rank(b))
            .then_with(|| a.cmp(b))
    }

    fn priority_rank(&self, location: &CommitLocation) -> u8 {
        match (location.repo == self.main_repo, self.is_default_branch(location)) {
            (true, true) => 0,
            (false, true) => 1,
            _ => 2,
        }
    }

    /// Hash-level merge-base lookup, see [`super::merge_base::find_merge_base`].
    pub fn merge_base(&self, first: &str, second: &str) -> Option<&str> {
        let first = self.lookup(first)?;
        let second = self.lookup(second)?;
        super::merge_base::find_merge_base(self, first, second)
            .map(|id| self.commits[id].hash.as_str())
    }

    // ─── Mutation (resolver / finalizer only) ───────────────────────

    /// Collapse a commit to exactly `location`.
    pub(crate) fn assign(&mut self, id: CommitId, location: CommitLocation) {
        self.locations[id] = vec![location];
    }

    /// Remove `location` from a commit's candidates unless it is the last one.
    /// Returns whether anything was removed.
    pub(crate) fn remove_location(&mut self, id: CommitId, location: &CommitLocation) -> bool {
        let candidates = &mut self.locations[id];
        if candidates.len() < 2 {
            return false;
        }
        let before = candidates.len();
        candidates.retain(|c| c != location);
        candidates.len() != before
    }

    /// Hand the arena and the final location sets to the output assembler.
    pub(crate) fn into_parts(self) -> (Vec<Commit>, Vec<Vec<CommitLocation>>) {
        (self.commits, self.locations)
    }

    // ─── Reference sanitizer ────────────────────────────────────────

    /// Drop parent hashes that were never fetched (history truncated by the
    /// fetch window). Returns how many references were removed.
    pub fn sanitize_references(&mut self) -> usize {
        let ids = &self.ids;
        let mut dropped = 0;
        for commit in &mut self.commits {
            let before = commit.parent_hashes.len();
            commit.parent_hashes.retain(|parent| ids.contains_key(parent));
            dropped += before - commit.parent_hashes.len();
        }
        if dropped > 0 {
            debug!(dropped, "Dropped parent references outside the fetched set");
        }
        dropped
    }
}

#[cfg(test)]
impl CommitIndex {
    /// Overwrite a commit's candidate set, bypassing the never-empty guard.
    pub(crate) fn force_locations(&mut self, id: CommitId, locations: Vec<CommitLocation>) {
        self.locations[id] = locations;
    }
}
