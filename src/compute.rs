// src/compute.rs
//
// Per-file churn computation. Line queries fan out across the rayon pool;
// a profile is only assembled once every line of the file has answered.

use crate::history::ChangeHistory;
use crate::model::FileChurnProfile;
use indicatif::ProgressBar;
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation shared between a running cycle and its caller.
/// Checked between files and between lines; a cancelled computation never
/// produces a partial profile.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Re-arm after a cancelled cycle so a later trigger can run again.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Result of computing one file in one cycle.
#[derive(Debug)]
pub enum Computed {
    Profile(FileChurnProfile),
    /// Too few lines, or a line query failed; nothing merged this cycle
    Skipped,
    Cancelled,
}

enum LineFailure {
    Query,
    Cancelled,
}

/// Compute a complete churn profile for one tracked file.
///
/// `identity` must be the content identity captured when the file was
/// collected, so the stored profile matches the content the staleness check
/// saw rather than whatever is on disk by the time the last line query
/// finishes.
pub fn churn_profile<H: ChangeHistory + ?Sized>(
    history: &H,
    path: &str,
    content: &str,
    identity: String,
    cancel: &CancelToken,
    progress: &ProgressBar,
) -> Computed {
    let line_count = content.lines().count();
    if line_count < 2 {
        // Single-line and empty files carry no per-line signal
        return Computed::Skipped;
    }

    let counts: Result<Vec<u32>, LineFailure> = (1..=line_count)
        .into_par_iter()
        .map(|line_no| {
            if cancel.is_cancelled() {
                return Err(LineFailure::Cancelled);
            }
            let count = history.line_touch_count(path, line_no).map_err(|e| {
                log::warn!("skipping {path}: line {line_no} query failed: {e}");
                LineFailure::Query
            })?;
            progress.inc(1);
            Ok(count)
        })
        .collect();

    let line_churn = match counts {
        Ok(line_churn) => line_churn,
        Err(LineFailure::Cancelled) => return Computed::Cancelled,
        Err(LineFailure::Query) => return Computed::Skipped,
    };

    let overall_churn = match history.file_touch_count(path) {
        Ok(count) => count,
        Err(e) => {
            log::warn!("skipping {path}: file query failed: {e}");
            return Computed::Skipped;
        }
    };

    match FileChurnProfile::from_counts(identity, line_churn, overall_churn) {
        Some(profile) => Computed::Profile(profile),
        // Unreachable behind the line-count guard, but a missing maximum
        // must never panic the cycle
        None => Computed::Skipped,
    }
}
