// src/engine.rs
//
// Heatmap cycle orchestration: discovery → staleness check → computation →
// cache merge → ranking rebuild, one cycle in flight at a time.

use crate::cache::{CacheStore, ChurnCache};
use crate::compute::{churn_profile, CancelToken, Computed};
use crate::discover::FileDiscovery;
use crate::history::ChangeHistory;
use crate::model::{RankingIndex, RepoChurnMap};
use crate::ranking;
use anyhow::Result;
use indicatif::ProgressBar;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// How a heatmap cycle ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Rankings rebuilt and ready to read
    Done,
    /// A full cycle ran but produced an empty hotspot ranking; stale
    /// presentation state has been cleared. Not an error.
    NoData,
    /// Cancelled between files or lines; cache untouched by partial work,
    /// rankings left as they were
    Cancelled,
    /// Another cycle was already in flight; this request was dropped
    Busy,
}

/// Where the current cycle is. Purely informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Collecting,
    Computing,
    Ranking,
}

/// One file that passed collection and is waiting on computation.
struct PendingFile {
    path: String,
    content: String,
    identity: String,
    line_count: usize,
}

struct EngineState {
    cache: ChurnCache,
    rankings: RankingIndex,
    phase: Phase,
}

/// Owns the churn cache and the derived rankings; the only writer of both.
pub struct HeatmapEngine<D, H, S> {
    discovery: D,
    history: H,
    store: S,
    workdir: PathBuf,
    state: Mutex<EngineState>,
    busy: AtomicBool,
    cancel: CancelToken,
}

impl<D: FileDiscovery, H: ChangeHistory, S: CacheStore> HeatmapEngine<D, H, S> {
    /// Load the persisted cache (empty on first use) and wire up the
    /// collaborators.
    pub fn new(discovery: D, history: H, store: S, workdir: PathBuf) -> Result<Self> {
        let cache = store.load()?;
        Ok(Self {
            discovery,
            history,
            store,
            workdir,
            state: Mutex::new(EngineState {
                cache,
                rankings: RankingIndex::default(),
                phase: Phase::Idle,
            }),
            busy: AtomicBool::new(false),
            cancel: CancelToken::new(),
        })
    }

    fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handle for asking a running cycle to stop. Cancellation is
    /// cooperative; the cycle reacts between files and between lines.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn phase(&self) -> Phase {
        self.state().phase
    }

    /// Snapshot of the cached profiles, for presentation consumers.
    pub fn cached_profiles(&self) -> RepoChurnMap {
        self.state().cache.profiles().clone()
    }

    /// Snapshot of both ranked views as of the last completed cycle.
    pub fn rankings(&self) -> RankingIndex {
        self.state().rankings.clone()
    }

    /// Run one heatmap cycle. Returns immediately with [`Outcome::Busy`]
    /// if another cycle is already in flight (dropped, not queued).
    pub fn generate_heatmap(&self) -> Result<Outcome> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(Outcome::Busy);
        }
        let result = self.run_cycle();
        self.state().phase = Phase::Idle;
        self.busy.store(false, Ordering::Release);
        result
    }

    fn run_cycle(&self) -> Result<Outcome> {
        self.state().phase = Phase::Collecting;
        let pending = match self.collect_files()? {
            Some(pending) => pending,
            None => return Ok(self.finish_cancelled()),
        };

        self.state().phase = Phase::Computing;
        if !self.compute_files(pending)? {
            return Ok(self.finish_cancelled());
        }

        self.state().phase = Phase::Ranking;
        let mut state = self.state();
        let rankings = ranking::build(state.cache.profiles());
        if rankings.is_empty() {
            // Clear whatever an earlier cycle left on screen
            state.rankings = RankingIndex::default();
            Ok(Outcome::NoData)
        } else {
            state.rankings = rankings;
            Ok(Outcome::Done)
        }
    }

    fn finish_cancelled(&self) -> Outcome {
        // Re-arm the token so a later trigger can run a fresh cycle
        self.cancel.reset();
        Outcome::Cancelled
    }

    /// Walk discovery output down to the files worth recomputing: tracked,
    /// at least two lines, and stale against the cache. Returns `None` on
    /// cancellation.
    fn collect_files(&self) -> Result<Option<Vec<PendingFile>>> {
        let candidates = self.discovery.candidate_files()?;
        let bar = ProgressBar::new(candidates.len() as u64);
        bar.set_message("collecting files");

        let mut pending = Vec::new();
        for path in candidates {
            bar.inc(1);
            if self.cancel.is_cancelled() {
                bar.finish_and_clear();
                return Ok(None);
            }
            if !self.history.is_tracked(&path) {
                continue;
            }
            let content = match std::fs::read_to_string(self.workdir.join(&path)) {
                Ok(content) => content,
                Err(e) => {
                    log::debug!("skipping unreadable {path}: {e}");
                    continue;
                }
            };
            let line_count = content.lines().count();
            if line_count < 2 {
                continue;
            }
            // Identity is captured here, before any line query runs, so the
            // merged profile describes exactly this content
            let identity = match self.history.content_identity(&path) {
                Ok(identity) => identity,
                Err(e) => {
                    log::warn!("skipping {path}: identity query failed: {e}");
                    continue;
                }
            };
            if !self.state().cache.is_stale(&path, &identity) {
                continue;
            }
            pending.push(PendingFile {
                path,
                content,
                identity,
                line_count,
            });
        }
        bar.finish_and_clear();
        Ok(Some(pending))
    }

    /// Compute and merge profiles for the collected files. Returns `false`
    /// on cancellation; everything merged so far stays merged.
    fn compute_files(&self, pending: Vec<PendingFile>) -> Result<bool> {
        if pending.is_empty() {
            return Ok(true);
        }
        let total_lines: usize = pending.iter().map(|f| f.line_count).sum();
        let bar = ProgressBar::new(total_lines as u64);
        bar.set_message("computing churn");

        let mut merged_any = false;
        for file in pending {
            if self.cancel.is_cancelled() {
                bar.finish_and_clear();
                return Ok(false);
            }
            bar.set_message(file.path.clone());
            let computed = churn_profile(
                &self.history,
                &file.path,
                &file.content,
                file.identity,
                &self.cancel,
                &bar,
            );
            match computed {
                Computed::Profile(profile) => {
                    self.state().cache.merge(file.path, profile);
                    merged_any = true;
                }
                Computed::Skipped => {}
                Computed::Cancelled => {
                    bar.finish_and_clear();
                    return Ok(false);
                }
            }
        }
        bar.finish_and_clear();

        if merged_any {
            // Persistence failure is cycle-fatal; the in-memory cache keeps
            // its merged state for this session
            self.store.save(&self.state().cache)?;
        }
        Ok(true)
    }
}
