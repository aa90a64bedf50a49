//! Canonical commit graph reconstruction across a repository and its forks.
//!
//! Binary crate entry point. All CLI logic is in the `cli` module.

// mimalloc keeps the many short-lived per-run maps cheap.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

mod cli;

fn main() {
    cli::run();
}
