//! Prelude module for convenient imports.
//!
//! Import commonly used types with a single line:
//!
//! ```rust,ignore
//! use deadcss_core::prelude::*;
//! ```
//!
//! This provides the types needed to run an analysis and read its results
//! without pulling in the individual stage APIs.

// Core types
pub use crate::error::{DeadcssError, DeadcssResult};
pub use crate::{Selector, SelectorSet};

// Builder API
pub use crate::builder::{Deadcss, Report, SkippedInput};

// Results
pub use crate::pipeline::AnalysisResult;
pub use crate::stages::StageResult;

// Configuration
pub use crate::config::{load_config, DeadcssConfig};

// Reporting
pub use crate::report::{print_json, print_plain};
