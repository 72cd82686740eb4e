// src/ranking.rs

use crate::model::{RankingIndex, RepoChurnMap};

/// Rebuild both ranked views from the cache.
///
/// A full linear scan plus stable sort on every cycle; the dataset is the
/// set of tracked files, small enough that incremental re-sorting would buy
/// nothing. Stable sort keeps tied entries from jittering between builds
/// over the same cache.
pub fn build(cache: &RepoChurnMap) -> RankingIndex {
    let mut entries: Vec<_> = cache
        .iter()
        .map(|(path, profile)| (path.clone(), profile.clone()))
        .collect();
    // Fix the scan order up front so ties resolve the same way every build
    entries.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut by_hotspot = entries.clone();
    by_hotspot.sort_by(|(_, a), (_, b)| b.hottest_line_value.cmp(&a.hottest_line_value));

    let mut by_overall = entries;
    by_overall.sort_by(|(_, a), (_, b)| b.overall_churn.cmp(&a.overall_churn));

    RankingIndex { by_hotspot, by_overall }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FileChurnProfile;

    fn profile(line_churn: Vec<u32>, overall: u32) -> FileChurnProfile {
        FileChurnProfile::from_counts("id".into(), line_churn, overall).unwrap()
    }

    #[test]
    fn empty_cache_yields_empty_rankings() {
        let index = build(&RepoChurnMap::new());
        assert!(index.by_hotspot.is_empty());
        assert!(index.by_overall.is_empty());
        assert!(index.is_empty());
    }

    #[test]
    fn rankings_are_descending() {
        let mut cache = RepoChurnMap::new();
        cache.insert("a.rs".into(), profile(vec![1, 9], 4));
        cache.insert("b.rs".into(), profile(vec![3, 2], 30));
        cache.insert("c.rs".into(), profile(vec![6, 6], 8));

        let index = build(&cache);
        for pair in index.by_hotspot.windows(2) {
            assert!(pair[0].1.hottest_line_value >= pair[1].1.hottest_line_value);
        }
        for pair in index.by_overall.windows(2) {
            assert!(pair[0].1.overall_churn >= pair[1].1.overall_churn);
        }
        assert_eq!(index.by_hotspot[0].0, "a.rs");
        assert_eq!(index.by_overall[0].0, "b.rs");
        assert_eq!(index.max_line_churn(), Some(9));
        assert_eq!(index.max_overall_churn(), Some(30));
    }

    #[test]
    fn ties_are_stable_across_builds() {
        let mut cache = RepoChurnMap::new();
        cache.insert("x.rs".into(), profile(vec![5], 5));
        cache.insert("y.rs".into(), profile(vec![5], 5));
        cache.insert("z.rs".into(), profile(vec![5], 5));

        let first = build(&cache);
        let second = build(&cache);
        let order = |idx: &RankingIndex| -> Vec<String> {
            idx.by_hotspot.iter().map(|(p, _)| p.clone()).collect()
        };
        assert_eq!(order(&first), order(&second));
    }

    #[test]
    fn single_entry_appears_in_both_views() {
        let mut cache = RepoChurnMap::new();
        cache.insert("only.rs".into(), profile(vec![5, 12, 3], 20));

        let index = build(&cache);
        assert_eq!(index.by_hotspot.len(), 1);
        assert_eq!(index.by_overall.len(), 1);
        let (_, p) = &index.by_hotspot[0];
        assert_eq!(p.hottest_line_value, 12);
        assert_eq!(p.hottest_line_index, 2);
        assert_eq!(p.overall_churn, 20);
    }
}
