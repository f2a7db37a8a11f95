//! Builder pattern API for deadcss analysis.
//!
//! Provides a fluent interface for configuring and running the analysis
//! over a set of files and directories:
//!
//! ```rust,ignore
//! use deadcss_core::prelude::*;
//!
//! let report = Deadcss::new(["site/", "templates/"])
//!     .source_extensions([".js", ".twig"])
//!     .ignore_patterns([".js-*"])
//!     .analyze()?;
//!
//! for result in &report.results {
//!     println!("{}: {} unused", result.css_file.display(), result.unused_selectors.len());
//! }
//! ```

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::css::parse_css;
use crate::dom::{parse_html, HtmlDocument};
use crate::error::DeadcssError;
use crate::pipeline::{analyze, AnalysisResult};
use crate::scan::collect_files;
use crate::source::SourceFile;
use crate::SelectorSet;

/// Default CSS extensions.
pub const DEFAULT_CSS_EXTENSIONS: &[&str] = &[".css"];
/// Default HTML extensions.
pub const DEFAULT_HTML_EXTENSIONS: &[&str] = &[".html", ".htm"];
/// Default extensions of other source files searched for ids and classes.
pub const DEFAULT_SOURCE_EXTENSIONS: &[&str] = &[".php", ".py", ".rb", ".js", ".tpl"];

/// Builder for configuring dead selector analysis.
#[derive(Debug, Clone)]
pub struct Deadcss {
    /// Files and directories to scan
    seeds: Vec<PathBuf>,

    /// Extensions of stylesheets to analyze
    css_extensions: Vec<String>,

    /// Extensions of documents for DOM matching
    html_extensions: Vec<String>,

    /// Extensions of files searched for ids and classes
    source_extensions: Vec<String>,

    /// Directory names skipped while collecting files
    excluded_dirs: Vec<String>,

    /// Selector patterns left out of the unused report
    ignored_patterns: Vec<String>,

    /// Whether to run the DOM stage
    use_dom: bool,

    /// Whether to run the id/class stage
    use_grep: bool,
}

impl Deadcss {
    /// Create a new analysis builder for the given files and directories.
    pub fn new(seeds: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            seeds: seeds.into_iter().map(Into::into).collect(),
            css_extensions: to_strings(DEFAULT_CSS_EXTENSIONS),
            html_extensions: to_strings(DEFAULT_HTML_EXTENSIONS),
            source_extensions: to_strings(DEFAULT_SOURCE_EXTENSIONS),
            excluded_dirs: Vec::new(),
            ignored_patterns: Vec::new(),
            use_dom: true,
            use_grep: true,
        }
    }

    /// Replace the stylesheet extensions.
    pub fn css_extensions(mut self, exts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.css_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the HTML document extensions.
    pub fn html_extensions(mut self, exts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.html_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the extensions of other source files.
    pub fn source_extensions(mut self, exts: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.source_extensions = exts.into_iter().map(Into::into).collect();
        self
    }

    /// Add directories to exclude from scanning.
    pub fn exclude_dirs(mut self, dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.excluded_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Add patterns for selectors to leave out of the unused report.
    pub fn ignore_patterns(mut self, patterns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.ignored_patterns
            .extend(patterns.into_iter().map(Into::into));
        self
    }

    /// Enable or disable DOM matching against HTML documents.
    pub fn with_dom(mut self, enabled: bool) -> Self {
        self.use_dom = enabled;
        self
    }

    /// Enable or disable id/class search in other source files.
    pub fn with_grep(mut self, enabled: bool) -> Self {
        self.use_grep = enabled;
        self
    }

    /// Run the analysis and return the report.
    ///
    /// Only a missing seed list is fatal; unreadable or malformed inputs are
    /// skipped and listed in [`Report::skipped`].
    pub fn analyze(&self) -> Result<Report> {
        if self.seeds.is_empty() {
            return Err(DeadcssError::invalid_argument("no input paths given").into());
        }

        let mut skipped = Vec::new();

        // 1. Collect files per category
        let css_files = self.collect(&self.css_extensions, &mut skipped, true);
        let html_files = if self.use_dom {
            self.collect(&self.html_extensions, &mut skipped, false)
        } else {
            Vec::new()
        };
        let src_files = if self.use_grep {
            self.collect(&self.source_extensions, &mut skipped, false)
        } else {
            Vec::new()
        };
        info!(count = css_files.len(), "working with CSS files");
        info!(count = html_files.len(), "working with HTML files");
        info!(count = src_files.len(), "working with source files");
        debug!(css = ?css_files, html = ?html_files, sources = ?src_files, "collected files");

        // 2. Parse stylesheets and read sources in parallel
        let stylesheets: Vec<(PathBuf, Result<SelectorSet, DeadcssError>)> = css_files
            .par_iter()
            .map(|path| (path.clone(), parse_css(path)))
            .collect();
        let sources: Vec<Result<SourceFile, DeadcssError>> =
            src_files.par_iter().map(|path| SourceFile::read(path)).collect();
        let sources = keep_loaded(sources, &mut skipped);

        // Parsed documents are not thread-safe: build them on this thread
        let documents: Vec<Result<HtmlDocument, DeadcssError>> =
            html_files.iter().map(|path| parse_html(path)).collect();
        let documents = keep_loaded(documents, &mut skipped);

        // 3. One independent pipeline run per stylesheet
        let mut results = Vec::with_capacity(stylesheets.len());
        for (css_file, parsed) in stylesheets {
            let selectors = match parsed {
                Ok(selectors) => selectors,
                Err(e) => {
                    skipped.push(SkippedInput::from_error(&e));
                    continue;
                }
            };
            info!(
                path = %css_file.display(),
                selectors = selectors.len(),
                "analysing CSS selectors"
            );

            let mut result = analyze(css_file, selectors, &documents, &sources);
            if !self.ignored_patterns.is_empty() {
                result.retain_unused(|s| !self.is_ignored(s));
            }
            results.push(result);
        }

        Ok(Report {
            generated_at: Utc::now(),
            css_file_count: css_files.len(),
            html_file_count: documents.len(),
            source_file_count: sources.len(),
            results,
            skipped,
        })
    }

    /// Collects files for one category; failed seeds are recorded once.
    fn collect(
        &self,
        extensions: &[String],
        skipped: &mut Vec<SkippedInput>,
        record_errors: bool,
    ) -> Vec<PathBuf> {
        let collection = collect_files(&self.seeds, Some(extensions), &self.excluded_dirs);
        if record_errors {
            for e in &collection.errors {
                skipped.push(SkippedInput::from_error(e));
            }
        }
        collection.files
    }

    /// Check if a selector matches any ignored pattern.
    fn is_ignored(&self, selector: &str) -> bool {
        self.ignored_patterns
            .iter()
            .any(|pattern| matches_pattern(selector, pattern))
    }
}

/// `prefix*`, `*suffix`, exact, or substring match.
pub fn matches_pattern(selector: &str, pattern: &str) -> bool {
    if pattern.is_empty() {
        return false;
    }
    if let Some(prefix) = pattern.strip_suffix('*') {
        selector.starts_with(prefix)
    } else if let Some(suffix) = pattern.strip_prefix('*') {
        selector.ends_with(suffix)
    } else {
        selector == pattern || selector.contains(pattern)
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Keeps successfully loaded inputs and records the failures.
fn keep_loaded<T>(loaded: Vec<Result<T, DeadcssError>>, skipped: &mut Vec<SkippedInput>) -> Vec<T> {
    loaded
        .into_iter()
        .filter_map(|r| match r {
            Ok(item) => Some(item),
            Err(e) => {
                skipped.push(SkippedInput::from_error(&e));
                None
            }
        })
        .collect()
}

/// An input that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedInput {
    /// Offending path, if known
    pub path: Option<PathBuf>,
    /// Human-readable reason
    pub reason: String,
}

impl SkippedInput {
    /// Records an error and logs it as a warning.
    pub fn from_error(err: &DeadcssError) -> Self {
        warn!(error = %err, "skipping input");
        Self {
            path: err.path().cloned(),
            reason: err.to_string(),
        }
    }
}

/// Results of analyzing every stylesheet.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// When the analysis finished
    pub generated_at: DateTime<Utc>,
    /// Number of stylesheets found
    pub css_file_count: usize,
    /// Number of HTML documents used for DOM matching
    pub html_file_count: usize,
    /// Number of source files used for id/class search
    pub source_file_count: usize,
    /// One result per successfully parsed stylesheet
    pub results: Vec<AnalysisResult>,
    /// Inputs that failed to load
    pub skipped: Vec<SkippedInput>,
}

impl Report {
    /// Whether any stylesheet has unused selectors left.
    pub fn has_unused(&self) -> bool {
        self.results.iter().any(AnalysisResult::has_unused)
    }

    /// Total unused selectors across stylesheets.
    pub fn unused_count(&self) -> usize {
        self.results.iter().map(|r| r.unused_selectors.len()).sum()
    }

    /// Total selectors across stylesheets.
    pub fn selector_count(&self) -> usize {
        self.results.iter().map(|r| r.selectors.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn create_test_site(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("deadcss_builder_test")
            .join(format!("{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(dir.join("js")).expect("Failed to create test directory");

        fs::write(dir.join("style.css"), "#a { } .b { } div { } .js-toggle { }")
            .expect("Failed to write style.css");
        fs::write(dir.join("index.html"), "<html><body><p id=\"a\">x</p></body></html>")
            .expect("Failed to write index.html");
        fs::write(dir.join("js/app.js"), "el.classList.add('b');")
            .expect("Failed to write app.js");

        dir
    }

    #[test]
    fn test_builder_basic() {
        let dir = create_test_site("basic");
        let report = Deadcss::new([&dir]).analyze().unwrap();

        assert_eq!(report.results.len(), 1);
        let result = &report.results[0];
        assert_eq!(result.selectors.len(), 4);
        assert!(result.unused_selectors.contains("div"));
        assert!(result.unused_selectors.contains(".js-toggle"));
        assert!(!result.unused_selectors.contains("#a"));
        assert!(!result.unused_selectors.contains(".b"));
        assert_eq!(report.html_file_count, 1);
        assert_eq!(report.source_file_count, 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_builder_ignore_patterns() {
        let dir = create_test_site("ignore");
        let report = Deadcss::new([&dir])
            .ignore_patterns([".js-*"])
            .analyze()
            .unwrap();

        let result = &report.results[0];
        assert!(!result.unused_selectors.contains(".js-toggle"));
        assert!(result.unused_selectors.contains("div"));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_builder_disabled_stages() {
        let dir = create_test_site("disabled");
        let report = Deadcss::new([&dir])
            .with_dom(false)
            .with_grep(false)
            .analyze()
            .unwrap();

        let result = &report.results[0];
        assert!(result.stages.is_empty());
        assert_eq!(result.unused_selectors, result.selectors);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_no_seeds_is_fatal() {
        let seeds: Vec<PathBuf> = Vec::new();
        assert!(Deadcss::new(seeds).analyze().is_err());
    }

    #[test]
    fn test_missing_seed_is_skipped() {
        let dir = create_test_site("missing");
        let missing = dir.join("does-not-exist");
        let report = Deadcss::new([dir.clone(), missing]).analyze().unwrap();

        assert_eq!(report.results.len(), 1);
        assert_eq!(report.skipped.len(), 1);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_matches_pattern() {
        assert!(matches_pattern(".js-toggle", ".js-*"));
        assert!(matches_pattern("a.external", "*external"));
        assert!(matches_pattern("#nav .item", ".item"));
        assert!(!matches_pattern(".item", "#nav"));
        assert!(!matches_pattern(".item", ""));
    }

    #[test]
    fn test_report_stats() {
        let dir = create_test_site("stats");
        let report = Deadcss::new([&dir]).analyze().unwrap();
        assert!(report.has_unused());
        assert_eq!(report.selector_count(), 4);
        assert_eq!(report.unused_count(), 2);

        fs::remove_dir_all(&dir).ok();
    }
}
