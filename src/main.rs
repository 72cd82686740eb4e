// src/main.rs

mod cache;
mod cli;
mod color;
mod compute;
mod discover;
mod engine;
mod history;
mod model;
mod ranking;

use anyhow::{Context, Result};
use cache::JsonCacheStore;
use clap::Parser;
use cli::Args;
use discover::WorkspaceScanner;
use engine::{HeatmapEngine, Outcome};
use history::GitHistory;
use model::RankingIndex;
use std::time::Instant;

const RESET: &str = "\x1b[0m";

fn main() {
    env_logger::init();
    let args = Args::parse();
    let start = Instant::now();

    match run(&args) {
        Ok(()) => println!("Total time: {:.2?}", start.elapsed()),
        Err(e) => {
            eprintln!("Error generating heatmap: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let repo = git2::Repository::discover(&args.repo)
        .with_context(|| format!("no git repository at {}", args.repo.display()))?;
    let root = repo
        .workdir()
        .context("bare repositories have no files to map")?
        .to_path_buf();

    let discovery = WorkspaceScanner::new(root.clone(), args.include.as_deref(), args.exclude.as_deref())?;
    let history = GitHistory::new(root.clone(), args.git_args.clone());
    let store = JsonCacheStore::new(&root);
    let engine = HeatmapEngine::new(discovery, history, store, root)?;

    match engine.generate_heatmap()? {
        Outcome::Done => print_rankings(&engine.rankings(), args.top),
        Outcome::NoData => println!(
            "Couldn't gather sufficient data to generate a heatmap with current settings. \
             Include/exclude patterns or extra git args may be too strict."
        ),
        Outcome::Cancelled => println!("Heatmap generation cancelled."),
        Outcome::Busy => println!("A heatmap cycle is already running."),
    }
    Ok(())
}

fn print_rankings(rankings: &RankingIndex, top: usize) {
    let line_max = rankings.max_line_churn().unwrap_or(0);
    println!("Hottest lines:");
    for (path, profile) in rankings.by_hotspot.iter().take(top) {
        let swatch = heat_swatch(profile.hottest_line_value, line_max);
        println!(
            "  {swatch} {:>5}  {path}:{}",
            profile.hottest_line_value, profile.hottest_line_index
        );
    }

    let overall_max = rankings.max_overall_churn().unwrap_or(0);
    println!("\nHottest files:");
    for (path, profile) in rankings.by_overall.iter().take(top) {
        let swatch = heat_swatch(profile.overall_churn, overall_max);
        println!("  {swatch} {:>5}  {path}", profile.overall_churn);
    }
}

/// Colored terminal cell for one churn value, normalized against the
/// ranking maximum. A zero maximum means every value is zero; there is no
/// gradient to show, so the swatch stays uncolored rather than dividing by
/// zero.
fn heat_swatch(value: u32, max: u32) -> String {
    if max == 0 {
        return "  ".to_string();
    }
    let tint = color::color_for(value as f32 / max as f32);
    format!("{}  {RESET}", color::ansi_bg(tint))
}
