//! Per-CSS-source elimination pipeline.
//!
//! Starts from "every selector is unused" and narrows the set with the DOM
//! stage (when HTML documents are available) and then the id/class stage
//! (when other source files are available). Order only affects cost, not
//! the final set: DOM matching is the more precise signal and shrinks the
//! grep workload.

use std::path::PathBuf;

use serde::Serialize;

use crate::dom::SelectorEvaluator;
use crate::source::SourceFile;
use crate::stages::{eliminate_by_dom, eliminate_by_grep, StageResult};
use crate::SelectorSet;

/// Analysis of one CSS source.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    /// CSS file the selectors came from
    pub css_file: PathBuf,
    /// All selectors extracted from the file
    pub selectors: SelectorSet,
    /// Stage diagnostics in execution order (skipped stages are absent)
    pub stages: Vec<StageResult>,
    /// Selectors no stage could show to be possibly used
    pub unused_selectors: SelectorSet,
}

impl AnalysisResult {
    /// Whether any selector is left unused.
    pub fn has_unused(&self) -> bool {
        !self.unused_selectors.is_empty()
    }

    /// Percentage of selectors left unused.
    pub fn unused_percentage(&self) -> f64 {
        if self.selectors.is_empty() {
            0.0
        } else {
            (self.unused_selectors.len() as f64 / self.selectors.len() as f64) * 100.0
        }
    }

    /// Drops selectors matching a predicate from the reported unused set.
    ///
    /// Stage diagnostics are left as they were computed.
    pub fn retain_unused<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.unused_selectors.retain(|s| keep(s));
    }
}

/// Runs the elimination stages for one CSS source.
///
/// With no documents and no sources, the unused set equals `selectors`.
pub fn analyze<D: SelectorEvaluator>(
    css_file: impl Into<PathBuf>,
    selectors: SelectorSet,
    documents: &[D],
    sources: &[SourceFile],
) -> AnalysisResult {
    let mut unused = selectors.clone();
    let mut stages = Vec::new();

    if !documents.is_empty() {
        let result = eliminate_by_dom(&unused, documents);
        unused = result.unused_selectors.clone();
        stages.push(StageResult::DomMatching(result));
    }

    if !sources.is_empty() {
        let result = eliminate_by_grep(&unused, sources);
        unused = result.unused_selectors.clone();
        stages.push(StageResult::IdclassElimination(result));
    }

    AnalysisResult {
        css_file: css_file.into(),
        selectors,
        stages,
        unused_selectors: unused,
    }
}
