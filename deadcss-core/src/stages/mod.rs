//! Elimination stages.
//!
//! Each stage is a pure transform from a candidate set to a narrower
//! remaining set, with diagnostics describing the evidence it used:
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  selectors   │ ──▶ │   dom.rs     │ ──▶ │   grep.rs    │ ──▶ unused
//! │ (all unused) │     │ match HTML   │     │ find ids and │
//! └──────────────┘     │ documents    │     │ classes as   │
//!                      └──────────────┘     │ words        │
//!                                           └──────────────┘
//! ```
//!
//! A stage never adds a selector back: `remaining ⊆ candidates`.

pub mod dom;
pub mod grep;

pub use dom::{eliminate_by_dom, DocumentMatch, DomStageResult};
pub use grep::{eliminate_by_grep, GrepStageResult};

use serde::Serialize;

use crate::SelectorSet;

/// Diagnostics of one stage run, in pipeline order.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageResult {
    DomMatching(DomStageResult),
    IdclassElimination(GrepStageResult),
}

impl StageResult {
    /// Short stage name for reports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::DomMatching(_) => "DOM matching",
            Self::IdclassElimination(_) => "id/class elimination",
        }
    }

    /// The candidates the stage started from.
    pub fn candidates(&self) -> usize {
        match self {
            Self::DomMatching(r) => r.candidates,
            Self::IdclassElimination(r) => r.candidates,
        }
    }

    /// The unused set the stage produced.
    pub fn unused_selectors(&self) -> &SelectorSet {
        match self {
            Self::DomMatching(r) => &r.unused_selectors,
            Self::IdclassElimination(r) => &r.unused_selectors,
        }
    }
}
