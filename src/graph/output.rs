//! Output assembler: write resolved locations back onto the commits.

use std::collections::HashSet;

use tracing::error;

use crate::Commit;

use super::index::CommitIndex;
use super::ResolveReport;

/// Marker preceding the `owner/name` segment of a commit web URL.
pub const HOST_MARKER: &str = "github.com/";

/// Replace the `owner/name` segment after [`HOST_MARKER`] with `repo`.
///
/// URLs without the marker, or with fewer than two path segments after it,
/// come back unchanged.
pub fn rewrite_url(url: &str, repo: &str) -> String {
    let Some(start) = url.find(HOST_MARKER).map(|i| i + HOST_MARKER.len()) else {
        return url.to_string();
    };
    let mut segments = url[start..].splitn(3, '/');
    let (Some(owner), Some(name)) = (segments.next(), segments.next()) else {
        return url.to_string();
    };
    if owner.is_empty() || name.is_empty() {
        return url.to_string();
    }
    match segments.next() {
        Some(tail) => format!("{}{}/{}", &url[..start], repo, tail),
        None => format!("{}{}", &url[..start], repo),
    }
}

/// Consume the index and emit one commit per hash, in first-seen order.
///
/// A hash left with zero locations is dropped and one left with several keeps
/// the first; both are logged as consistency violations and counted in `report`.
pub fn assemble(index: CommitIndex, report: &mut ResolveReport) -> Vec<Commit> {
    let (commits, locations) = index.into_parts();
    let mut output = Vec::with_capacity(commits.len());

    for (mut commit, candidates) in commits.into_iter().zip(locations) {
        let total = candidates.len();
        let Some(location) = candidates.into_iter().next() else {
            error!(hash = %commit.hash, "Commit ended resolution with no location, dropping it");
            report.dropped_commits += 1;
            continue;
        };
        if total > 1 {
            error!(
                hash = %commit.hash,
                candidates = total,
                kept = %location,
                "Commit ended resolution with several locations, keeping the first"
            );
            report.multi_location_commits += 1;
        }

        commit.url = rewrite_url(&commit.url, &location.repo);
        commit.repo = location.repo;
        commit.branch = location.branch;
        output.push(commit);
    }

    if report.dropped_commits > 0 {
        let emitted: HashSet<String> = output.iter().map(|c| c.hash.clone()).collect();
        for commit in &mut output {
            commit.parent_hashes.retain(|p| emitted.contains(p));
        }
    }

    output
}
