//! deadcss-core: unused CSS selector detection library
//!
//! Finds CSS selectors that cannot be shown to be used by a site. Every
//! selector of a stylesheet starts out as a candidate for removal; two
//! elimination stages then clear the candidates for which usage evidence
//! exists:
//!
//! - **DOM matching**: a selector matching at least one element of a static
//!   HTML document is possibly used.
//! - **Id/class elimination**: a selector whose `#id` or `.class` name occurs
//!   as a whole word in a template or script is possibly used.
//!
//! Whatever survives both stages is reported. The result is an
//! over-approximation of the used set: a reported selector is a strong
//! candidate for removal, a cleared one is not proven used.
//!
//! # Quick Start
//!
//! Use the [`prelude`] module for convenient imports:
//!
//! ```rust,ignore
//! use deadcss_core::prelude::*;
//!
//! let report = Deadcss::new(["public/", "templates/"]).analyze()?;
//!
//! for result in &report.results {
//!     for selector in &result.unused_selectors {
//!         println!("{}: {}", result.css_file.display(), selector);
//!     }
//! }
//! ```
//!
//! # Module Organization
//!
//! - [`scan`]: Parallel file discovery by extension
//! - [`css`]: Stylesheet parsing into selector sets
//! - [`extract`]: Id and class extraction from selectors
//! - [`dom`]: HTML documents and selector evaluation
//! - [`source`]: Word lookup in non-HTML sources
//! - [`stages`]: The two elimination stages
//! - [`pipeline`]: Per-stylesheet stage orchestration
//! - [`builder`]: Fluent builder API for configuration
//! - [`report`]: Plain and JSON output
//! - [`error`]: Typed error handling
//!
//! # Cargo Features
//!
//! - `html` (default): Enable the standalone HTML report
//! - `full`: Enable all optional features

use std::collections::BTreeSet;

// Core modules (always available)
pub mod builder;
pub mod config;
pub mod css;
pub mod dom;
pub mod error;
pub mod extract;
pub mod logging;
pub mod pipeline;
pub mod prelude;
pub mod report;
pub mod scan;
pub mod source;
pub mod stages;

// Feature-gated modules
#[cfg(feature = "html")]
pub mod report_html;

/// A CSS selector exactly as written in the stylesheet (one item of a
/// selector list, trimmed).
pub type Selector = String;

/// Ordered set of selectors. Ordering keeps reports deterministic.
pub type SelectorSet = BTreeSet<Selector>;

// ============================================================================
// Explicit Re-exports
// ============================================================================

// Error types
pub use error::{DeadcssError, DeadcssResult, IoResultExt};

// Builder API
pub use builder::{
    matches_pattern, Deadcss, Report, SkippedInput, DEFAULT_CSS_EXTENSIONS,
    DEFAULT_HTML_EXTENSIONS, DEFAULT_SOURCE_EXTENSIONS,
};

// Configuration
pub use config::{
    load_config, load_config_file, DeadcssConfig, ExtensionsConfig, OutputConfig,
    CONFIG_FILE_NAME,
};

// Parsing
pub use css::{parse_css, parse_css_str};
pub use dom::{parse_html, relax_selector, HtmlDocument, SelectorEvaluator};
pub use extract::{extract_identifiers, Identifier, IdentifierExtraction, OriginMap};
pub use source::SourceFile;

// File scanning
pub use scan::{collect_files, normalize_extensions, FileCollection, EXCLUDED_DIRS};

// Elimination
pub use pipeline::{analyze, AnalysisResult};
pub use stages::{
    eliminate_by_dom, eliminate_by_grep, DocumentMatch, DomStageResult, GrepStageResult,
    StageResult,
};

// Logging
pub use logging::init_logging;

// Reporting
pub use report::{print_json, print_plain, render_json, render_plain, write_json};

#[cfg(feature = "html")]
pub use report_html::generate_html_report;

#[cfg(test)]
mod tests;
