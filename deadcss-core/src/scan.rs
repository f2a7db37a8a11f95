//! Parallel, deterministic file discovery with efficient directory pruning.
//!
//! Performance optimizations:
//! - Early directory pruning via `WalkDir::filter_entry` (O(1) subtree skip)
//! - Parallel file processing via Rayon's `par_bridge`
//! - Minimal work in parallel threads (only the extension check)
//!
//! A seed that cannot be walked is reported back to the caller instead of
//! failing the whole collection.

use rayon::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::DeadcssError;

/// Directories to exclude by default (version control metadata).
pub const EXCLUDED_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Files found under a set of seeds plus the seeds/entries that failed.
#[derive(Debug, Default)]
pub struct FileCollection {
    /// Matching files, sorted and de-duplicated
    pub files: Vec<PathBuf>,
    /// Per-seed or per-entry failures (recoverable)
    pub errors: Vec<DeadcssError>,
}

/// Normalizes user-supplied extensions to lowercase with a leading dot.
pub fn normalize_extensions<I, S>(extensions: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    extensions
        .into_iter()
        .map(|e| e.as_ref().trim().to_lowercase())
        .filter(|e| !e.is_empty() && e != ".")
        .map(|e| if e.starts_with('.') { e } else { format!(".{}", e) })
        .collect()
}

/// Case-insensitive check of the filename suffix against an extension set.
///
/// `None` accepts every file.
#[inline]
fn has_extension(path: &Path, extensions: Option<&HashSet<String>>) -> bool {
    match extensions {
        None => true,
        Some(exts) => path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| exts.contains(&format!(".{}", ext.to_lowercase()))),
    }
}

/// Checks if a directory entry should be pruned (excluded from traversal).
#[inline]
fn is_excluded_dir(entry: &walkdir::DirEntry, excludes: &HashSet<&str>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| excludes.contains(name))
}

/// Collects files recursively from the given seeds.
///
/// - A seed that is a file is taken as-is if its extension matches.
/// - A seed that is a directory is walked recursively, skipping default and
///   custom excluded directory names.
/// - A seed that is neither produces an `InvalidArgument` error entry.
///
/// `extensions` are matched case-insensitively on the filename suffix;
/// `None` accepts every file.
pub fn collect_files<I, S>(
    seeds: &[PathBuf],
    extensions: Option<I>,
    excludes: &[String],
) -> FileCollection
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let extensions = extensions.map(normalize_extensions);
    let all_excludes: HashSet<&str> = EXCLUDED_DIRS
        .iter()
        .copied()
        .chain(excludes.iter().map(String::as_str))
        .collect();

    let mut collection = FileCollection::default();

    for seed in seeds {
        if seed.is_file() {
            if has_extension(seed, extensions.as_ref()) {
                collection.files.push(seed.clone());
            }
        } else if seed.is_dir() {
            let results: Vec<Result<PathBuf, DeadcssError>> = WalkDir::new(seed)
                .into_iter()
                // filter_entry prunes entire subtrees before iteration
                .filter_entry(|e| !is_excluded_dir(e, &all_excludes))
                .par_bridge()
                .filter_map(|entry| match entry {
                    Ok(e) => {
                        let path = e.path();
                        if path.is_file() && has_extension(path, extensions.as_ref()) {
                            Some(Ok(path.to_path_buf()))
                        } else {
                            None
                        }
                    }
                    Err(e) => {
                        let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| seed.clone());
                        let message = e.to_string();
                        Some(Err(match e.into_io_error() {
                            Some(io) => DeadcssError::io(path, io),
                            None => DeadcssError::Io {
                                path,
                                message,
                                source: None,
                            },
                        }))
                    }
                })
                .collect();

            for result in results {
                match result {
                    Ok(path) => collection.files.push(path),
                    Err(e) => collection.errors.push(e),
                }
            }
        } else {
            collection.errors.push(DeadcssError::invalid_argument(format!(
                "{} is neither a file nor a directory",
                seed.display()
            )));
        }
    }

    // par_bridge does not preserve order
    collection.files.sort();
    collection.files.dedup();
    collection
}
