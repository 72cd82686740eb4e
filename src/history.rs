// src/history.rs
//
// Change-history queries against git. Line and file touch counts shell out
// to the git binary (libgit2 has no equivalent of `git log -L`); tracked
// checks and content hashing go through git2 directly.

use anyhow::{anyhow, Context, Result};
use git2::{ObjectType, Oid, Repository};
use std::path::{Path, PathBuf};
use std::process::Command;

/// History queries the churn computation needs. Every call may block on an
/// external process and must be recoverable on its own; one failed query
/// never poisons the rest of a cycle.
pub trait ChangeHistory: Sync {
    /// Whether the file is tracked. Fails closed: an error during the
    /// check means "not tracked", the file is silently skipped.
    fn is_tracked(&self, path: &str) -> bool;

    /// Opaque identity of the file's current content, stable for unchanged
    /// content. Compared only for equality.
    fn content_identity(&self, path: &str) -> Result<String>;

    /// Distinct historical commits whose diff touched the given 1-based
    /// line, under the prevailing history filter.
    fn line_touch_count(&self, path: &str, line_no: usize) -> Result<u32>;

    /// Distinct historical commits touching the file as a whole, under the
    /// same filter.
    fn file_touch_count(&self, path: &str) -> Result<u32>;
}

/// Git-backed provider rooted at a repository workdir.
pub struct GitHistory {
    root: PathBuf,
    /// Extra arguments narrowing history queries (e.g. `--since`,
    /// `--author`); opaque to the rest of the crate.
    extra_args: Vec<String>,
}

impl GitHistory {
    pub fn new(root: PathBuf, extra_args: Vec<String>) -> Self {
        Self { root, extra_args }
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .current_dir(&self.root)
            .args(args)
            .output()
            .context("failed to execute git")?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            Err(anyhow!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }
}

impl ChangeHistory for GitHistory {
    fn is_tracked(&self, path: &str) -> bool {
        let tracked = || -> Result<bool> {
            let repo = Repository::open(&self.root)?;
            let index = repo.index()?;
            Ok(index.get_path(Path::new(path), 0).is_some())
        };
        tracked().unwrap_or(false)
    }

    fn content_identity(&self, path: &str) -> Result<String> {
        let bytes = std::fs::read(self.root.join(path))
            .with_context(|| format!("failed to read {path}"))?;
        let oid = Oid::hash_object(ObjectType::Blob, &bytes)
            .with_context(|| format!("failed to hash {path}"))?;
        Ok(oid.to_string())
    }

    fn line_touch_count(&self, path: &str, line_no: usize) -> Result<u32> {
        let range = format!("{line_no},{line_no}:{path}");
        let mut args = vec!["log", "--no-patch", "--format=%H"];
        args.extend(self.extra_args.iter().map(String::as_str));
        args.extend(["-L", &range]);
        let logs = self.git(&args)?;
        Ok(logs.lines().filter(|l| !l.is_empty()).count() as u32)
    }

    fn file_touch_count(&self, path: &str) -> Result<u32> {
        // Filter args go before the pathspec separator
        let mut args = vec!["rev-list", "--count"];
        args.extend(self.extra_args.iter().map(String::as_str));
        args.extend(["HEAD", "--", path]);
        let out = self.git(&args)?;
        out.trim()
            .parse()
            .with_context(|| format!("unparseable rev-list count for {path}"))
    }
}
