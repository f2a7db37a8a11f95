//! Id and class extraction from selector strings.
//!
//! Builds the inverted index (origin map) from identifier to the selectors
//! containing it, so that "identifier found" can be translated back into
//! "these selectors are possibly used".

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::{Selector, SelectorSet};

/// An id or class token referenced inside a selector.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum Identifier {
    /// `#name`
    Id(String),
    /// `.name`
    Class(String),
}

impl Identifier {
    /// The bare name without prefix.
    pub fn name(&self) -> &str {
        match self {
            Self::Id(name) | Self::Class(name) => name,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(name) => write!(f, "#{}", name),
            Self::Class(name) => write!(f, ".{}", name),
        }
    }
}

/// Identifier → selectors containing it, in input iteration order.
pub type OriginMap = BTreeMap<Identifier, Vec<Selector>>;

/// Result of extracting identifiers from a selector set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentifierExtraction {
    /// Bare id names
    pub ids: BTreeSet<String>,
    /// Bare class names
    pub classes: BTreeSet<String>,
    /// Inverted index from identifier to owning selectors
    pub origins: OriginMap,
}

impl IdentifierExtraction {
    /// Selectors owning the given identifier (empty if unknown).
    pub fn origins_of(&self, identifier: &Identifier) -> &[Selector] {
        self.origins
            .get(identifier)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#([a-zA-Z0-9]+)").expect("Hardcoded regex pattern is valid"))
}

fn class_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.([a-zA-Z0-9]+)").expect("Hardcoded regex pattern is valid"))
}

/// Extracts ids and classes from every selector in the set.
///
/// Tokens are runs of ASCII alphanumerics following `#` or `.`, so
/// `.nav-item` contributes the class `nav` and `#main:hover` the id `main`.
/// A selector without any token contributes nothing.
pub fn extract_identifiers(selectors: &SelectorSet) -> IdentifierExtraction {
    let mut extraction = IdentifierExtraction::default();

    for selector in selectors {
        for caps in id_regex().captures_iter(selector) {
            let name = caps[1].to_string();
            extraction.ids.insert(name.clone());
            extraction
                .origins
                .entry(Identifier::Id(name))
                .or_default()
                .push(selector.clone());
        }
        for caps in class_regex().captures_iter(selector) {
            let name = caps[1].to_string();
            extraction.classes.insert(name.clone());
            extraction
                .origins
                .entry(Identifier::Class(name))
                .or_default()
                .push(selector.clone());
        }
    }

    extraction
}
