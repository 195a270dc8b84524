//! Source discovery.
//!
//! Walks the configured input directories and reads every matching file into
//! a [`Source`]. Runs before any SVG work: the whole list is gathered first,
//! then handed to the generation pass.
//!
//! ## Directory Structure
//!
//! ```text
//! project/                     # Config directory
//! ├── spritemap.toml
//! └── icons/                   # input.directories = ["icons"]
//!     ├── arrow.svg            # location "icons/arrow.svg"
//!     ├── nav/
//!     │   └── home.svg         # location "icons/nav/home.svg"
//!     ├── .drafts/             # hidden: skipped with everything inside
//!     └── notes.txt            # wrong extension: skipped
//! ```
//!
//! ## Ordering
//!
//! Directories are visited in configuration order; within a directory,
//! entries are sorted by file name. Sprite order in the spritemap (and so
//! the stacked layout) follows this order, which keeps output stable across
//! machines.
//!
//! ## Duplicates
//!
//! Overlapping directories (`["icons", "icons/nav"]`) reach the same file
//! twice. The later occurrence is dropped unless `input.allow_duplicates`
//! is set.
//!
//! Files are read in parallel with rayon; collection keeps discovery order.

use crate::config::InputConfig;
use crate::types::Source;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Input directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Discover and read all sources below `root`.
pub fn scan(root: &Path, input: &InputConfig) -> Result<Vec<Source>, ScanError> {
    let paths = discover(root, input)?;
    read_sources(root, &paths)
}

/// Matching file paths, in discovery order.
pub fn discover(root: &Path, input: &InputConfig) -> Result<Vec<PathBuf>, ScanError> {
    let mut found = Vec::new();
    let mut seen = HashSet::new();

    for directory in &input.directories {
        let dir = root.join(directory);
        if !dir.is_dir() {
            return Err(ScanError::MissingDirectory(dir));
        }
        let walker = WalkDir::new(&dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || !has_extension(path, &input.extensions) {
                continue;
            }
            if !seen.insert(path.to_path_buf()) && !input.allow_duplicates {
                tracing::debug!(path = %path.display(), "skipping duplicate source");
                continue;
            }
            found.push(path.to_path_buf());
        }
    }
    tracing::debug!(count = found.len(), "discovered sources");
    Ok(found)
}

/// Read `paths` in parallel. Locations are relative to `root`, `/`-separated.
///
/// Content that is not valid UTF-8 is decoded lossily rather than failing
/// the whole scan.
pub fn read_sources(root: &Path, paths: &[PathBuf]) -> Result<Vec<Source>, ScanError> {
    paths
        .par_iter()
        .map(|path| {
            let bytes = fs::read(path).map_err(|source| ScanError::Read {
                path: path.clone(),
                source,
            })?;
            Ok(Source::new(location(root, path), decode(path, bytes)))
        })
        .collect()
}

fn decode(path: &Path, bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(path = %path.display(), "source is not valid UTF-8, decoding lossily");
            String::from_utf8_lossy(err.as_bytes()).into_owned()
        }
    }
}

/// Display location of `path`: relative to `root` when possible.
pub fn location(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(&ext))
}
