//! File enumeration.
//!
//! Turns command-line paths plus include/exclude glob lists into the
//! ordered set of files a run uploads.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, trace};

use crate::core::cancel::CancelToken;
use crate::core::constants;
use crate::core::storage::{LocalFile, StorageItem};
use crate::error::{Result, StorageError};

/// Include and exclude patterns, each from a comma-separated list.
#[derive(Debug, Clone)]
pub struct Selection {
    include: Vec<String>,
    exclude: Vec<Pattern>,
}

fn split(list: &str) -> impl Iterator<Item = &str> {
    list.split(',').map(str::trim).filter(|p| !p.is_empty())
}

impl Selection {
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPattern` for a malformed glob.
    pub fn new(include: Option<&str>, exclude: Option<&str>) -> Result<Self> {
        let mut includes = Vec::new();
        for pattern in split(include.unwrap_or(constants::DEFAULT_INCLUDE)) {
            Pattern::new(pattern).map_err(|e| invalid(pattern, e))?;
            includes.push(pattern.to_string());
        }
        if includes.is_empty() {
            includes.push(constants::DEFAULT_INCLUDE.to_string());
        }

        let exclude = split(exclude.unwrap_or_default())
            .map(|p| Pattern::new(p).map_err(|e| invalid(p, e)))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            include: includes,
            exclude,
        })
    }

    fn excluded(&self, relative: &Path) -> bool {
        self.exclude.iter().any(|p| p.matches_path(relative))
    }

    /// Files selected under `root`, sorted, without the excluded ones.
    pub fn walk(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let base = root.to_str().ok_or_else(|| StorageError::InvalidPattern {
            pattern: root.display().to_string(),
            reason: "path is not valid UTF-8".to_string(),
        })?;
        let base = Pattern::escape(base);

        let mut found = Vec::new();
        for include in &self.include {
            let full = format!("{}/{}", base.trim_end_matches('/'), include);
            let paths = glob::glob(&full).map_err(|e| invalid(include, e))?;

            for entry in paths {
                let path = entry.map_err(|e| StorageError::Access {
                    path: e.path().display().to_string(),
                    source: e.into(),
                })?;
                if !path.is_file() {
                    continue;
                }
                let relative = path.strip_prefix(root).unwrap_or(&path);
                if self.excluded(relative) {
                    trace!(path = %path.display(), "excluded");
                    continue;
                }
                found.push(path);
            }
        }
        Ok(found)
    }
}

fn invalid(pattern: &str, err: glob::PatternError) -> StorageError {
    StorageError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: err.msg.to_string(),
    }
}

/// Resolve `paths` into the ordered list of files to upload.
///
/// Files are taken as given. Directories are searched with `selection`.
/// With no paths the current directory is searched. Duplicates keep their
/// first position. An empty result is not an error here.
///
/// # Errors
///
/// Returns `StorageError::Access` if a path does not exist or cannot be
/// read.
pub fn enumerate(paths: &[PathBuf], selection: &Selection) -> Result<Vec<PathBuf>> {
    let roots = if paths.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        paths.to_vec()
    };

    let mut seen = HashSet::new();
    let mut files = Vec::new();
    for root in &roots {
        let metadata = std::fs::metadata(root).map_err(|e| StorageError::Access {
            path: root.display().to_string(),
            source: e,
        })?;

        let batch = if metadata.is_dir() {
            selection.walk(root)?
        } else {
            vec![root.clone()]
        };
        for path in batch {
            if seen.insert(path.clone()) {
                files.push(path);
            }
        }
    }

    debug!(count = files.len(), "enumerated files");
    Ok(files)
}

/// Wrap enumerated paths as local storage items sharing `cancel`.
pub fn into_items(paths: Vec<PathBuf>, cancel: &CancelToken) -> Vec<Box<dyn StorageItem>> {
    paths
        .into_iter()
        .map(|p| Box::new(LocalFile::new(p, cancel.clone())) as Box<dyn StorageItem>)
        .collect()
}
