// src/cli.rs

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the git repository to analyze
    #[arg(short, long, default_value = ".")]
    pub repo: PathBuf,

    /// Regex that repo-relative paths must match to be considered
    #[arg(long)]
    pub include: Option<String>,

    /// Regex of repo-relative paths to leave out
    #[arg(long)]
    pub exclude: Option<String>,

    /// Extra argument passed through to git history queries, repeatable
    /// (e.g. --git-arg=--since=6.months --git-arg=--author=alice)
    #[arg(long = "git-arg", value_name = "ARG")]
    pub git_args: Vec<String>,

    /// Number of rows to show in each ranking
    #[arg(long, default_value_t = 10)]
    pub top: usize,
}
