// src/discover.rs
//
// Candidate file discovery. The heatmap core only needs "which paths might
// be worth asking git about"; tracked-status and staleness filtering happen
// later in the cycle.

use anyhow::{Context, Result};
use regex::Regex;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Supplies candidate repo-relative paths for a cycle.
pub trait FileDiscovery {
    fn candidate_files(&self) -> Result<Vec<String>>;
}

/// Walks the repository workdir, applying user include/exclude patterns.
pub struct WorkspaceScanner {
    root: PathBuf,
    include: Option<Regex>,
    exclude: Option<Regex>,
}

impl WorkspaceScanner {
    pub fn new(root: PathBuf, include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).with_context(|| format!("invalid file pattern: {pattern}"))
        };
        Ok(Self {
            root,
            include: include.map(compile).transpose()?,
            exclude: exclude.map(compile).transpose()?,
        })
    }

    fn matches(&self, rel: &str) -> bool {
        if let Some(include) = &self.include {
            if !include.is_match(rel) {
                return false;
            }
        }
        if let Some(exclude) = &self.exclude {
            if exclude.is_match(rel) {
                return false;
            }
        }
        true
    }
}

impl FileDiscovery for WorkspaceScanner {
    fn candidate_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| {
                let name = e.file_name().to_string_lossy();
                name != ".git" && name != ".heatline"
            });
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("discovery skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = match entry.path().strip_prefix(&self.root) {
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };
            if self.matches(&rel) {
                files.push(rel);
            }
        }
        files.sort();
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "line one\nline two\n").unwrap();
    }

    #[test]
    fn finds_files_and_skips_git_dir() {
        let tmp = tempfile::TempDir::new().unwrap();
        touch(tmp.path(), "src/main.rs");
        touch(tmp.path(), "README.md");
        touch(tmp.path(), ".git/config");
        touch(tmp.path(), ".heatline/cache.json");

        let scanner = WorkspaceScanner::new(tmp.path().to_path_buf(), None, None).unwrap();
        let files = scanner.candidate_files().unwrap();
        assert_eq!(files, vec!["README.md", "src/main.rs"]);
    }

    #[test]
    fn include_and_exclude_patterns_apply() {
        let tmp = tempfile::TempDir::new().unwrap();
        touch(tmp.path(), "src/main.rs");
        touch(tmp.path(), "src/gen/schema.rs");
        touch(tmp.path(), "docs/notes.md");

        let scanner =
            WorkspaceScanner::new(tmp.path().to_path_buf(), Some(r"\.rs$"), Some(r"^src/gen/"))
                .unwrap();
        let files = scanner.candidate_files().unwrap();
        assert_eq!(files, vec!["src/main.rs"]);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        assert!(WorkspaceScanner::new(tmp.path().to_path_buf(), Some("("), None).is_err());
    }
}
