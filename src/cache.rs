// src/cache.rs
//
// Persistent churn cache. Profiles live in `.heatline/cache.json` inside
// the repository so a cycle only recomputes files whose committed content
// actually changed since the last run.

use crate::model::{FileChurnProfile, FilePath, RepoChurnMap};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CACHE_DIR: &str = ".heatline";
const CACHE_FILE: &str = "cache.json";

/// Sole owner and writer of the path → profile map.
#[derive(Debug, Default)]
pub struct ChurnCache {
    profiles: RepoChurnMap,
}

impl ChurnCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from persisted profiles, dropping any entry whose stored
    /// fields no longer satisfy the profile invariant.
    pub fn from_profiles(profiles: RepoChurnMap) -> Self {
        let profiles = profiles
            .into_iter()
            .filter(|(path, profile)| {
                let ok = profile.is_consistent();
                if !ok {
                    log::warn!("dropping inconsistent cached profile for {path}");
                }
                ok
            })
            .collect();
        Self { profiles }
    }

    /// A file is stale when it has no cached profile or its committed
    /// content no longer matches the identity recorded at computation time.
    pub fn is_stale(&self, path: &str, current_identity: &str) -> bool {
        match self.profiles.get(path) {
            Some(profile) => profile.content_identity != current_identity,
            None => true,
        }
    }

    /// Replace the entry for `path` wholesale. Recomputation always yields
    /// a complete profile, so there is no field-by-field merge.
    pub fn merge(&mut self, path: FilePath, profile: FileChurnProfile) {
        self.profiles.insert(path, profile);
    }

    pub fn profiles(&self) -> &RepoChurnMap {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

/// On-disk shape of the cache blob.
#[derive(Debug, Serialize, Deserialize)]
struct PersistedCache {
    cached_at: DateTime<Utc>,
    profiles: RepoChurnMap,
}

/// Opaque get/set persistence for the cache, keyed by workspace.
pub trait CacheStore {
    fn load(&self) -> Result<ChurnCache>;
    fn save(&self, cache: &ChurnCache) -> Result<()>;
}

/// JSON file store under the repository root.
pub struct JsonCacheStore {
    path: PathBuf,
}

impl JsonCacheStore {
    pub fn new(repo_root: &Path) -> Self {
        Self {
            path: repo_root.join(CACHE_DIR).join(CACHE_FILE),
        }
    }
}

impl CacheStore for JsonCacheStore {
    /// Missing or unreadable blobs start an empty cache; every entry will
    /// simply be recomputed on the next cycle.
    fn load(&self) -> Result<ChurnCache> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Ok(ChurnCache::new()),
        };
        match serde_json::from_str::<PersistedCache>(&raw) {
            Ok(persisted) => Ok(ChurnCache::from_profiles(persisted.profiles)),
            Err(e) => {
                log::warn!("discarding unreadable churn cache {}: {e}", self.path.display());
                Ok(ChurnCache::new())
            }
        }
    }

    /// Save failures are cycle-fatal for the caller; the in-memory cache
    /// keeps its last merged state either way.
    fn save(&self, cache: &ChurnCache) -> Result<()> {
        let dir = self.path.parent().context("cache path has no parent")?;
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create cache dir {}", dir.display()))?;
        let persisted = PersistedCache {
            cached_at: Utc::now(),
            profiles: cache.profiles.clone(),
        };
        let raw = serde_json::to_string_pretty(&persisted)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("failed to write churn cache {}", self.path.display()))
    }
}
