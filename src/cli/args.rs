//! CLI argument structs for all subcommands.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(after_long_help = r#"INPUT FORMAT:
  A JSON snapshot produced by the fetch side:
  {
    "main_repo": "me/app",
    "default_branches": { "me/app": "main", "alice/app": "main" },
    "commits": [
      { "hash": "c0ffee", "parents": ["beef"], "date": 1700000000,
        "url": "https://github.com/alice/app/commit/c0ffee",
        "message": "Merge pull request #4 from alice/feature",
        "repo": "alice/app", "branch": "feature" }
    ]
  }
  The same hash may appear once per (repo, branch) it was fetched under.

EXAMPLES:
  Resolve to stdout:   forkgraph resolve --input snapshot.json
  Resolve to file:     forkgraph resolve -i snapshot.json -o commits.json --pretty
  With run summary:    forkgraph resolve -i snapshot.json --report
  Verbose decisions:   forkgraph --log-level debug resolve -i snapshot.json
"#)]
pub struct ResolveArgs {
    /// Snapshot to resolve
    #[arg(short, long)]
    pub input: PathBuf,

    /// Where to write the resolved commits (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Print the run's counters as JSON to stderr
    #[arg(long)]
    pub report: bool,
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Snapshot the commits were resolved from
    #[arg(short, long)]
    pub input: PathBuf,

    /// Resolved commit list (JSON array) to verify
    #[arg(short, long)]
    pub resolved: PathBuf,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Snapshot to inspect
    #[arg(short, long)]
    pub input: PathBuf,
}
