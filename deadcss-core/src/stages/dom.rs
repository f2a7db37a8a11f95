//! DOM elimination: clear every selector that matches a node in some document.
//!
//! Documents are visited in order and every match is removed from the
//! candidate set before the next document, so later documents only see the
//! selectors still unmatched.
//!
//! Evaluator errors are fail-open with respect to usage: the selector is
//! treated as not matched in that document and stays a candidate for the
//! grep stage.

use serde::Serialize;
use tracing::{debug, info};

use crate::dom::SelectorEvaluator;
use crate::SelectorSet;

/// Per-document diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMatch {
    /// Document label (path)
    pub document: String,
    /// Candidates evaluated against this document
    pub candidates_before: usize,
    /// Candidates matching at least one node
    pub matched: usize,
    /// Candidates left after this document
    pub remaining: usize,
    /// Selectors the evaluator could not handle
    pub evaluator_errors: usize,
}

/// Result of the DOM elimination stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DomStageResult {
    /// Size of the input candidate set
    pub candidates: usize,
    /// Per-document diagnostics, in evaluation order
    pub documents: Vec<DocumentMatch>,
    /// Selectors matched in some document
    pub matched_selectors: SelectorSet,
    /// Distinct selectors the evaluator rejected at least once
    pub erroneous_selectors: SelectorSet,
    /// Candidates not matched in any document
    pub unused_selectors: SelectorSet,
}

/// Removes every candidate matching at least one node in any document.
///
/// The input set is not modified; the result carries the remaining set.
pub fn eliminate_by_dom<D: SelectorEvaluator>(
    candidates: &SelectorSet,
    documents: &[D],
) -> DomStageResult {
    let mut result = DomStageResult {
        candidates: candidates.len(),
        ..Default::default()
    };
    let mut unused = candidates.clone();

    for document in documents {
        if unused.is_empty() {
            debug!(document = document.label(), "no candidates left, skipping document");
            continue;
        }

        let before = unused.len();
        debug!(document = document.label(), candidates = before, "DOM matching");

        let mut found = SelectorSet::new();
        let mut errors = 0;
        for selector in &unused {
            match document.matches(selector) {
                Ok(true) => {
                    found.insert(selector.clone());
                }
                Ok(false) => {}
                Err(e) => {
                    errors += 1;
                    result.erroneous_selectors.insert(selector.clone());
                    debug!(
                        document = document.label(),
                        selector = %selector,
                        error = %e,
                        "selector evaluation failed, treating as unmatched"
                    );
                }
            }
        }

        unused.retain(|s| !found.contains(s));
        info!(
            document = document.label(),
            candidates = before,
            matched = found.len(),
            unmatched = unused.len(),
            "DOM matching done"
        );

        result.documents.push(DocumentMatch {
            document: document.label().to_string(),
            candidates_before: before,
            matched: found.len(),
            remaining: unused.len(),
            evaluator_errors: errors,
        });
        result.matched_selectors.extend(found);
    }

    result.unused_selectors = unused;
    result
}
