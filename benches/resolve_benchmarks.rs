//! Criterion benchmarks for the resolution pipeline.
//!
//! Run with: `cargo bench`
//!
//! Synthetic fork histories keep results reproducible across machines:
//! a mainline of `depth` commits, plus `forks` fork branches that each add a
//! few commits and get merged back through a pull request merge commit.
//! Every mainline commit is re-fetched once per fork, as a real crawl would.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use forkgraph::graph::CommitIndex;
use forkgraph::{resolve, Commit, DefaultBranches};

const MAIN_REPO: &str = "me/app";

// ─── Helpers ─────────────────────────────────────────────────────────

fn commit(hash: String, parents: Vec<String>, repo: &str, branch: &str, ts: i64) -> Commit {
    let mut c = Commit::new(hash.clone(), parents, repo, branch);
    c.timestamp = Some(ts);
    c.url = format!("https://github.com/{}/commit/{}", repo, hash);
    c
}

fn build_synthetic_forks(depth: usize, forks: usize, commits_per_fork: usize) -> (Vec<Commit>, DefaultBranches) {
    let mut defaults = DefaultBranches::new();
    defaults.insert(MAIN_REPO.to_string(), "main".to_string());

    let fork_repos: Vec<String> = (0..forks).map(|f| format!("user{}/app", f)).collect();
    for repo in &fork_repos {
        defaults.insert(repo.clone(), "main".to_string());
    }

    let mut raw = Vec::new();
    let mut ts = 0i64;
    let mut tip = String::new();

    for i in 0..depth {
        ts += 1;
        let hash = format!("m{}", i);
        let parents = if i == 0 { vec![] } else { vec![tip.clone()] };
        raw.push(commit(hash.clone(), parents.clone(), MAIN_REPO, "main", ts));
        for repo in &fork_repos {
            raw.push(commit(hash.clone(), parents.clone(), repo, "main", ts));
        }
        tip = hash;
    }

    for (f, repo) in fork_repos.iter().enumerate() {
        let base = tip.clone();
        let mut fork_tip = base.clone();
        for c in 0..commits_per_fork {
            ts += 1;
            let hash = format!("f{}_{}", f, c);
            raw.push(commit(hash.clone(), vec![fork_tip.clone()], repo, "feature", ts));
            raw.push(commit(hash.clone(), vec![fork_tip.clone()], MAIN_REPO, "main", ts));
            fork_tip = hash;
        }

        ts += 1;
        let merge = format!("merge{}", f);
        let mut merged = commit(merge.clone(), vec![tip.clone(), fork_tip], MAIN_REPO, "main", ts);
        merged.message = format!("Merge pull request #{} from user{}/feature", f + 1, f);
        raw.push(merged);
        tip = merge;
    }

    (raw, defaults)
}

// ─── Benchmarks ──────────────────────────────────────────────────────

fn bench_index_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("index_build");
    for &(depth, forks) in &[(200, 5), (1_000, 20)] {
        let (raw, defaults) = build_synthetic_forks(depth, forks, 10);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", depth, forks)),
            &raw,
            |b, raw| {
                b.iter(|| CommitIndex::build(black_box(raw.clone()), &defaults, MAIN_REPO));
            },
        );
    }
    group.finish();
}

fn bench_merge_base(c: &mut Criterion) {
    let (raw, defaults) = build_synthetic_forks(2_000, 1, 50);
    let mut index = CommitIndex::build(raw, &defaults, MAIN_REPO);
    index.sanitize_references();

    c.bench_function("merge_base_deep_fork", |b| {
        b.iter(|| index.merge_base(black_box("m1999"), black_box("f0_49")).map(str::len));
    });
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    group.sample_size(20);
    for &(depth, forks) in &[(200, 5), (1_000, 20), (2_000, 50)] {
        let (raw, defaults) = build_synthetic_forks(depth, forks, 10);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", depth, forks)),
            &raw,
            |b, raw| {
                b.iter(|| resolve(black_box(raw.clone()), &defaults, MAIN_REPO));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_index_build, bench_merge_base, bench_resolve);
criterion_main!(benches);
