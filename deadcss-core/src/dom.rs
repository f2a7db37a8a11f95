//! HTML documents and CSS selector evaluation using `scraper`.
//!
//! A static document can never be in a `:hover` or `:focus` state and has no
//! generated `::before` content, so selectors are relaxed before evaluation:
//! state pseudo-classes and pseudo-elements at the top level of the selector
//! are dropped (an emptied compound becomes `*`). Relaxation only ever
//! broadens a selector.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use scraper::{Html, Selector as CssSelector};
use tracing::debug;

use crate::error::{DeadcssError, DeadcssResult, IoResultExt};

/// Pseudo-classes that depend on user interaction, form state or history.
const STATE_PSEUDO_CLASSES: &[&str] = &[
    "active",
    "any-link",
    "autofill",
    "blank",
    "checked",
    "current",
    "default",
    "defined",
    "disabled",
    "enabled",
    "focus",
    "focus-visible",
    "focus-within",
    "fullscreen",
    "future",
    "hover",
    "in-range",
    "indeterminate",
    "invalid",
    "link",
    "local-link",
    "modal",
    "optional",
    "out-of-range",
    "past",
    "paused",
    "placeholder-shown",
    "playing",
    "popover-open",
    "read-only",
    "read-write",
    "required",
    "target",
    "target-within",
    "user-invalid",
    "user-valid",
    "valid",
    "visited",
];

/// Pseudo-elements that may still be written with a single colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["after", "before", "first-letter", "first-line"];

/// Evaluates selectors against one document.
///
/// This is the seam between the DOM elimination stage and the HTML engine.
pub trait SelectorEvaluator {
    /// Label used in logs and stage diagnostics (usually the file path).
    fn label(&self) -> &str;

    /// Whether the selector matches at least one node.
    ///
    /// Fails with [`DeadcssError::Selector`] when the selector cannot be
    /// evaluated.
    fn matches(&self, selector: &str) -> DeadcssResult<bool>;
}

/// A parsed HTML document.
pub struct HtmlDocument {
    label: String,
    html: Html,
}

impl std::fmt::Debug for HtmlDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlDocument")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

impl HtmlDocument {
    /// Parses HTML text. Real-world laxity (unclosed tags, stray end tags)
    /// is tolerated the way browsers tolerate it.
    pub fn parse(path: impl AsRef<Path>, text: &str) -> Self {
        let label = path.as_ref().display().to_string();
        let html = Html::parse_document(text);
        if !html.errors.is_empty() {
            debug!(
                path = %label,
                recovered_errors = html.errors.len(),
                "HTML parsed with recoverable errors"
            );
        }
        Self { label, html }
    }
}

impl SelectorEvaluator for HtmlDocument {
    fn label(&self) -> &str {
        &self.label
    }

    fn matches(&self, selector: &str) -> DeadcssResult<bool> {
        let relaxed = relax_selector(selector);
        let compiled = CssSelector::parse(&relaxed)
            .map_err(|e| DeadcssError::selector(selector, e.to_string()))?;
        Ok(self.html.select(&compiled).next().is_some())
    }
}

/// Reads and parses an HTML file.
///
/// Fails with `Io` when the file cannot be read and `Parse` when it is not
/// valid UTF-8.
pub fn parse_html(path: &Path) -> DeadcssResult<HtmlDocument> {
    let bytes = fs::read(path).with_path(path)?;
    let text = String::from_utf8(bytes)
        .map_err(|e| DeadcssError::parse(path, format!("not valid UTF-8: {}", e)))?;
    Ok(HtmlDocument::parse(path, &text))
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}

/// Whether a pseudo at top level can never match a static DOM.
fn is_droppable_pseudo(name: &str, double_colon: bool) -> bool {
    let lower = name.to_ascii_lowercase();
    double_colon
        || lower.starts_with('-')
        || STATE_PSEUDO_CLASSES.contains(&lower.as_str())
        || LEGACY_PSEUDO_ELEMENTS.contains(&lower.as_str())
}

/// Functional pseudo-classes whose arguments match independently of the
/// outer selector. Widening an argument widens the whole selector; `:not`
/// is absent because there widening an argument narrows the result.
const WIDENING_FUNCTIONS: &[&str] = &[
    "is",
    "where",
    "has",
    "matches",
    "any",
    "-webkit-any",
    "-moz-any",
];

/// Drops state pseudo-classes and pseudo-elements so the selector can be
/// evaluated against a static document.
///
/// Applies at the top level and inside the arguments of `:is()`, `:where()`
/// and `:has()`. Quoted strings, attribute brackets, escapes and the
/// arguments of other functional pseudos (`:not(...)`, `:nth-child(...)`)
/// are left untouched. Functional pseudos such as `::part(x)` are kept,
/// which makes the evaluator reject them.
pub fn relax_selector(selector: &str) -> Cow<'_, str> {
    let chars: Vec<char> = selector.chars().collect();
    let mut out = String::with_capacity(selector.len());
    let mut changed = false;
    // One entry per open bracket: may pseudos inside it be dropped
    let mut scopes: Vec<bool> = Vec::new();
    let mut next_paren_widens = false;
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let relaxable = scopes.last().copied().unwrap_or(true);

        if c == '\\' {
            out.push(c);
            if let Some(&next) = chars.get(i + 1) {
                out.push(next);
            }
            i += 2;
            continue;
        }

        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            i += 1;
            continue;
        }

        match c {
            '"' | '\'' => quote = Some(c),
            '(' => {
                scopes.push(relaxable && next_paren_widens);
                next_paren_widens = false;
            }
            '[' => scopes.push(false),
            ')' | ']' => {
                scopes.pop();
            }
            ':' => {
                let double_colon = chars.get(i + 1) == Some(&':');
                let name_start = if double_colon { i + 2 } else { i + 1 };
                let mut name_end = name_start;
                while name_end < chars.len() && is_name_char(chars[name_end]) {
                    name_end += 1;
                }
                let name: String = chars[name_start..name_end].iter().collect();
                let functional = chars.get(name_end) == Some(&'(');

                if functional {
                    next_paren_widens = !double_colon
                        && WIDENING_FUNCTIONS.contains(&name.to_ascii_lowercase().as_str());
                    out.extend(&chars[i..name_end]);
                    i = name_end;
                    continue;
                }

                if relaxable && !name.is_empty() && is_droppable_pseudo(&name, double_colon) {
                    let compound_empty = out.chars().last().map_or(true, |prev| {
                        prev.is_whitespace() || matches!(prev, '>' | '+' | '~' | '(' | ',')
                    });
                    if compound_empty {
                        out.push('*');
                    }
                    changed = true;
                    i = name_end;
                    continue;
                }
            }
            _ => {}
        }

        out.push(c);
        i += 1;
    }

    if changed {
        Cow::Owned(out)
    } else {
        Cow::Borrowed(selector)
    }
}
