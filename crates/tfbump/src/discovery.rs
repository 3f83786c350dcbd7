//! find files by glob pattern
//!
//! Patterns are matched against paths relative to the search root. `*` stays within a single
//! path component, `**` crosses directories. Hidden directories (`.terraform`, `.git`, ...) and
//! gitignored paths are not searched.
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

pub const DEFAULT_PATTERN: &str = "**/*.tf";

#[derive(thiserror::Error, Debug)]
pub enum DiscoveryError {
    #[error("invalid file pattern")]
    InvalidPattern(#[from] globset::Error),
}

/// Returns all files below `root` matching `pattern`, sorted
///
/// A pattern naming an existing file is returned as is, even if it lives in a hidden directory.
/// Directories that cannot be read are logged and left out.
pub fn find_files(root: &Path, pattern: &str) -> Result<Vec<PathBuf>, DiscoveryError> {
    let literal = root.join(pattern);
    if literal.is_file() {
        return Ok(vec![literal]);
    }

    let matcher = compile(pattern)?;
    let mut files = vec![];

    for entry in WalkBuilder::new(root).build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::warn!(%error, "skipping unreadable path");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|file_type| file_type.is_file()) {
            continue;
        }

        let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
        if matcher.is_match(relative) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    tracing::debug!(pattern, count = files.len(), "files found");
    Ok(files)
}

fn compile(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    let pattern = pattern.strip_prefix("./").unwrap_or(pattern);
    Ok(GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}
