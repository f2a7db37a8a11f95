//! Arbitrary source files (templates, scripts, server code) scanned as text.
//!
//! Content is tokenized as raw bytes: the search is a plain whole-word match,
//! so encodings other than UTF-8 work as long as identifiers are ASCII.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::bytes::Regex;

use crate::error::{DeadcssResult, IoResultExt};

/// Maximal runs of ASCII word bytes. Any other byte, including non-ASCII,
/// is a word boundary.
fn word_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9A-Za-z_]+").expect("Hardcoded regex pattern is valid"))
}

/// A source file reduced to the set of whole words it contains.
///
/// Tokenized once on load; every stylesheet's id/class stage reuses the
/// same word set.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
    words: HashSet<String>,
}

impl SourceFile {
    /// Tokenizes already loaded content.
    pub fn new(path: impl Into<PathBuf>, content: impl AsRef<[u8]>) -> Self {
        let words = word_regex()
            .find_iter(content.as_ref())
            // Matches are ASCII only
            .map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned())
            .collect();
        Self {
            path: path.into(),
            words,
        }
    }

    /// Reads and tokenizes a source file.
    pub fn read(path: &Path) -> DeadcssResult<Self> {
        let content = fs::read(path).with_path(path)?;
        Ok(Self::new(path, content))
    }

    /// Path the content was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Distinct whole words of the content.
    ///
    /// An ASCII alphanumeric identifier occurs as a whole word exactly when
    /// it is a member of this set.
    pub fn words(&self) -> &HashSet<String> {
        &self.words
    }
}
