//! CLI layer: argument parsing, logging setup, and subcommand implementations.

pub mod args;

pub use args::*;

use std::fs::File;
use std::io::{self, BufWriter};
use std::time::Instant;

use clap::{Parser, Subcommand};
use tracing::info;

use forkgraph::snapshot::snapshot_stats;
use forkgraph::{check_invariants, load_commits, load_input, resolve_with_report, write_commits, ForkGraphError};

// ─── CLI ─────────────────────────────────────────────────────────────

/// Canonical commit graph reconstruction across a repository and its forks
#[derive(Parser, Debug)]
#[command(name = "forkgraph", version, about, after_help = "\
Run 'forkgraph <COMMAND> --help' for detailed options and examples.")]
pub(crate) struct Cli {
    /// Log verbosity on stderr: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Resolve a snapshot into one commit per hash with corrected repo/branch/url
    Resolve(ResolveArgs),

    /// Verify a resolved commit list against the snapshot it came from
    Check(CheckArgs),

    /// Show duplication statistics of a snapshot without resolving it
    Stats(StatsArgs),
}

// ─── Main entry point ───────────────────────────────────────────────

pub fn run() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let result = match cli.command {
        Commands::Resolve(args) => cmd_resolve(args),
        Commands::Check(args) => cmd_check(args),
        Commands::Stats(args) => cmd_stats(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_ascii_lowercase().as_str() {
        "error" => tracing::Level::ERROR,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => tracing::Level::WARN,
    }
}

/// Logs always go to stderr so stdout stays clean JSON.
fn init_logging(level: &str) {
    tracing_subscriber::fmt()
        .with_max_level(parse_log_level(level))
        .with_target(true)
        .with_writer(io::stderr)
        .init();
}

// ─── Commands ───────────────────────────────────────────────────────

fn cmd_resolve(args: ResolveArgs) -> Result<(), ForkGraphError> {
    if args.output.as_ref() == Some(&args.input) {
        return Err(ForkGraphError::InvalidArgs(
            "--output must differ from --input (refusing to overwrite the snapshot)".to_string(),
        ));
    }

    let start = Instant::now();
    let input = load_input(&args.input)?;
    info!(
        path = %args.input.display(),
        commits = input.commits.len(),
        main_repo = %input.main_repo,
        "Snapshot loaded"
    );

    let (resolved, report) = resolve_with_report(input.commits, &input.default_branches, &input.main_repo);

    match &args.output {
        Some(path) => {
            let writer = BufWriter::new(File::create(path)?);
            write_commits(writer, &resolved, args.pretty)?;
            eprintln!(
                "Resolved {} commits ({} distinct of {} fetched) to {} in {:.2?}",
                resolved.len(),
                report.distinct_commits,
                report.input_commits,
                path.display(),
                start.elapsed()
            );
        }
        None => {
            let stdout = io::stdout();
            write_commits(BufWriter::new(stdout.lock()), &resolved, args.pretty)?;
        }
    }

    if args.report {
        eprintln!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn cmd_check(args: CheckArgs) -> Result<(), ForkGraphError> {
    let input = load_input(&args.input)?;
    let resolved = load_commits(&args.resolved)?;
    let report = check_invariants(&input.commits, &resolved);

    if report.is_clean() {
        eprintln!("{} commits, all invariants hold.", resolved.len());
        return Ok(());
    }

    for hash in &report.duplicate_hashes {
        eprintln!("  duplicate hash: {}", hash);
    }
    for (commit, parent) in &report.dangling_parents {
        eprintln!("  dangling parent: {} -> {}", commit, parent);
    }
    for hash in &report.unknown_hashes {
        eprintln!("  not in input: {}", hash);
    }
    for hash in &report.missing_hashes {
        eprintln!("  missing from output: {}", hash);
    }
    Err(ForkGraphError::InvariantViolation {
        path: args.resolved.display().to_string(),
        count: report.violation_count(),
    })
}

fn cmd_stats(args: StatsArgs) -> Result<(), ForkGraphError> {
    let input = load_input(&args.input)?;
    let stats = snapshot_stats(&input);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
