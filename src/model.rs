// src/model.rs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Repo-relative path of a tracked file
pub type FilePath = String;

/// Per-file churn profile, recomputed whole whenever the file's content changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileChurnProfile {
    /// Opaque content identity (git blob hash); compared for equality only
    pub content_identity: String,
    /// One touch count per source line, in file line order
    pub line_churn: Vec<u32>,
    /// Maximum of `line_churn`
    pub hottest_line_value: u32,
    /// 1-based position of the first occurrence of the maximum
    pub hottest_line_index: usize,
    /// Commits touching the file as a whole; independent of the per-line sum
    pub overall_churn: u32,
}

impl FileChurnProfile {
    /// Assemble a profile from collected line counts. Returns `None` for an
    /// empty sequence so a maximum is never taken over nothing; callers
    /// filter sub-2-line files before this point.
    pub fn from_counts(content_identity: String, line_churn: Vec<u32>, overall_churn: u32) -> Option<Self> {
        let max = *line_churn.iter().max()?;
        let first = line_churn.iter().position(|&c| c == max)?;
        Some(Self {
            content_identity,
            line_churn,
            hottest_line_value: max,
            hottest_line_index: first + 1,
            overall_churn,
        })
    }

    /// Check the internal invariant. Used to reject corrupt cache entries
    /// at load time.
    pub fn is_consistent(&self) -> bool {
        let max = match self.line_churn.iter().max() {
            Some(&m) => m,
            None => return false,
        };
        if self.hottest_line_value != max {
            return false;
        }
        match self.line_churn.iter().position(|&c| c == max) {
            Some(first) => self.hottest_line_index == first + 1,
            None => false,
        }
    }
}

/// Maps each tracked file path to its churn profile
pub type RepoChurnMap = HashMap<FilePath, FileChurnProfile>;

/// Two derived rankings, fully rebuilt from the cache after each cycle.
/// Never persisted; stale copies must not outlive a cache update.
#[derive(Debug, Clone, Default)]
pub struct RankingIndex {
    /// Descending by `hottest_line_value`
    pub by_hotspot: Vec<(FilePath, FileChurnProfile)>,
    /// Descending by `overall_churn`
    pub by_overall: Vec<(FilePath, FileChurnProfile)>,
}

impl RankingIndex {
    pub fn is_empty(&self) -> bool {
        self.by_hotspot.is_empty()
    }

    /// Normalization denominator for line-level presentation
    pub fn max_line_churn(&self) -> Option<u32> {
        self.by_hotspot.first().map(|(_, p)| p.hottest_line_value)
    }

    /// Normalization denominator for file-level presentation
    pub fn max_overall_churn(&self) -> Option<u32> {
        self.by_overall.first().map(|(_, p)| p.overall_churn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_counts_picks_first_max() {
        let p = FileChurnProfile::from_counts("id".into(), vec![5, 12, 3, 12], 20).unwrap();
        assert_eq!(p.hottest_line_value, 12);
        assert_eq!(p.hottest_line_index, 2);
        assert_eq!(p.line_churn[p.hottest_line_index - 1], 12);
        assert!(p.is_consistent());
    }

    #[test]
    fn from_counts_rejects_empty() {
        assert!(FileChurnProfile::from_counts("id".into(), vec![], 0).is_none());
    }

    #[test]
    fn consistency_rejects_bad_max() {
        let mut p = FileChurnProfile::from_counts("id".into(), vec![1, 2], 3).unwrap();
        p.hottest_line_value = 99;
        assert!(!p.is_consistent());
    }

    #[test]
    fn consistency_rejects_later_index() {
        let mut p = FileChurnProfile::from_counts("id".into(), vec![7, 7], 3).unwrap();
        p.hottest_line_index = 2;
        assert!(!p.is_consistent());
    }
}
