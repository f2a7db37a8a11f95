//! CSS selector extraction using the `cssparser` rule parsers.
//!
//! Every comma-separated selector of every style rule becomes one entry of
//! the resulting [`SelectorSet`]. Style rules nested in grouping at-rules
//! (`@media`, `@supports`, `@layer`, `@container`, `@document`) are included;
//! other at-rules (`@font-face`, `@keyframes`, `@import`, ...) carry no
//! selectors and are skipped.
//!
//! Rules nested inside style rules (CSS nesting) are resolved against their
//! parent: `.card { .title {} &:hover {} }` yields `.card`, `.card .title`
//! and `.card:hover`.
//!
//! Invalid rules are logged and skipped without affecting their neighbours.

use std::fs;
use std::path::Path;

use cssparser::{
    AtRuleParser, CowRcStr, DeclarationParser, ParseError, Parser, ParserInput, ParserState,
    QualifiedRuleParser, RuleBodyItemParser, RuleBodyParser, StyleSheetParser, Token,
};
use tracing::{debug, warn};

use crate::error::{DeadcssError, DeadcssResult, IoResultExt};
use crate::SelectorSet;

/// At-rules whose block contains a nested rule list.
const GROUPING_AT_RULES: &[&str] = &["media", "supports", "layer", "container", "document"];

/// What to do with the block of an at-rule.
enum AtRulePrelude {
    /// Block holds style rules: recurse.
    Grouping,
    /// Block holds declarations or keyframes: skip.
    Opaque,
}

/// Rule parser collecting raw selector text.
///
/// Each rule yields the selectors it contributes; invalid rules are counted.
#[derive(Default)]
struct SelectorCollector {
    invalid_rules: usize,
    /// Resolved selectors of the enclosing style rule (empty at top level)
    parents: Vec<String>,
}

impl SelectorCollector {
    /// Parses a top-level rule list and flattens the selectors of all valid
    /// rules.
    fn collect_rules<'i, 't>(&mut self, input: &mut Parser<'i, 't>) -> Vec<String> {
        let mut selectors = Vec::new();
        let mut invalid = 0;
        for rule in StyleSheetParser::new(input, self) {
            match rule {
                Ok(found) => selectors.extend(found),
                Err((err, slice)) => {
                    invalid += 1;
                    debug!(
                        rule = %slice.trim(),
                        line = err.location.line + 1,
                        column = err.location.column,
                        "skipping invalid CSS rule"
                    );
                }
            }
        }
        self.invalid_rules += invalid;
        selectors
    }

    /// Parses the body of a style rule: declarations mixed with nested
    /// rules. Declarations contribute nothing.
    fn collect_body<'i, 't>(&mut self, input: &mut Parser<'i, 't>) -> Vec<String> {
        let mut selectors = Vec::new();
        let mut invalid = 0;
        let body: RuleBodyParser<'i, 't, '_, Self, Vec<String>, ()> =
            RuleBodyParser::new(input, self);
        for item in body {
            match item {
                Ok(found) => selectors.extend(found),
                Err((err, slice)) => {
                    invalid += 1;
                    debug!(
                        item = %slice.trim(),
                        line = err.location.line + 1,
                        column = err.location.column,
                        "skipping invalid declaration or nested rule"
                    );
                }
            }
        }
        self.invalid_rules += invalid;
        selectors
    }

    /// Resolves a nested selector list against the enclosing rule.
    fn resolve(&self, selectors: Vec<String>) -> Vec<String> {
        if self.parents.is_empty() {
            return selectors;
        }
        self.parents
            .iter()
            .flat_map(|parent| selectors.iter().map(move |nested| nest_selector(parent, nested)))
            .collect()
    }
}

/// Combines a parent selector with a nested one.
///
/// A leading `&` is replaced by the parent text; any other `&` becomes
/// `:is(parent)`. Without `&`, the nested selector is a descendant (or uses
/// its own leading combinator).
fn nest_selector(parent: &str, nested: &str) -> String {
    if !nested.contains('&') {
        return format!("{} {}", parent, nested);
    }
    let wrapped = format!(":is({})", parent);
    let Some(rest) = nested.strip_prefix('&') else {
        return nested.replace('&', &wrapped);
    };

    // `&div` must keep the type selector first: `div:is(parent)`
    let type_len = rest
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
        .unwrap_or(rest.len());
    let rest = rest.replace('&', &wrapped);
    if type_len == 0 {
        format!("{}{}", parent, rest)
    } else {
        format!("{}{}{}", &rest[..type_len], wrapped, &rest[type_len..])
    }
}

/// Consumes one selector of a selector list and returns its source text.
///
/// Stray closing brackets, bad strings and empty items invalidate the rule,
/// as they would in a browser.
fn selector_text<'i, 't>(input: &mut Parser<'i, 't>) -> Result<String, ParseError<'i, ()>> {
    let start = input.position();
    let mut malformed = false;
    while let Ok(token) = input.next() {
        if matches!(
            token,
            Token::CloseCurlyBracket
                | Token::CloseParenthesis
                | Token::CloseSquareBracket
                | Token::BadString(_)
                | Token::BadUrl(_)
        ) {
            malformed = true;
        }
    }

    let text = input.slice_from(start).trim();
    if malformed || text.is_empty() {
        return Err(input.new_custom_error(()));
    }
    Ok(text.to_string())
}

impl<'i> QualifiedRuleParser<'i> for SelectorCollector {
    type Prelude = Vec<String>;
    type QualifiedRule = Vec<String>;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        let selectors = input.parse_comma_separated(|item| selector_text(item))?;
        Ok(self.resolve(selectors))
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::QualifiedRule, ParseError<'i, Self::Error>> {
        let outer = std::mem::replace(&mut self.parents, prelude.clone());
        let nested = self.collect_body(input);
        self.parents = outer;

        let mut selectors = prelude;
        selectors.extend(nested);
        Ok(selectors)
    }
}

impl<'i> DeclarationParser<'i> for SelectorCollector {
    type Declaration = Vec<String>;
    type Error = ();

    fn parse_value<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Declaration, ParseError<'i, Self::Error>> {
        // A {} block in a regular property value means this is a nested
        // rule such as `a:hover { ... }`; failing lets it be reparsed as one
        let custom_property = name.starts_with("--");
        while let Ok(token) = input.next() {
            if matches!(token, Token::CurlyBracketBlock) && !custom_property {
                return Err(input.new_custom_error(()));
            }
        }
        Ok(Vec::new())
    }
}

impl<'i> RuleBodyItemParser<'i, Vec<String>, ()> for SelectorCollector {
    fn parse_declarations(&self) -> bool {
        true
    }

    fn parse_qualified(&self) -> bool {
        true
    }
}

impl<'i> AtRuleParser<'i> for SelectorCollector {
    type Prelude = AtRulePrelude;
    type AtRule = Vec<String>;
    type Error = ();

    fn parse_prelude<'t>(
        &mut self,
        name: CowRcStr<'i>,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::Prelude, ParseError<'i, Self::Error>> {
        while input.next().is_ok() {}
        let grouping = GROUPING_AT_RULES
            .iter()
            .any(|rule| name.eq_ignore_ascii_case(rule));
        Ok(if grouping {
            AtRulePrelude::Grouping
        } else {
            AtRulePrelude::Opaque
        })
    }

    fn rule_without_block(
        &mut self,
        _prelude: Self::Prelude,
        _start: &ParserState,
    ) -> Result<Self::AtRule, ()> {
        // @import, @charset, @layer a, b;
        Ok(Vec::new())
    }

    fn parse_block<'t>(
        &mut self,
        prelude: Self::Prelude,
        _start: &ParserState,
        input: &mut Parser<'i, 't>,
    ) -> Result<Self::AtRule, ParseError<'i, Self::Error>> {
        match prelude {
            // Inside a style rule the block mixes declarations and rules
            AtRulePrelude::Grouping if !self.parents.is_empty() => Ok(self.collect_body(input)),
            AtRulePrelude::Grouping => Ok(self.collect_rules(input)),
            AtRulePrelude::Opaque => {
                while input.next().is_ok() {}
                Ok(Vec::new())
            }
        }
    }
}

/// Extracts selectors and counts the invalid rules skipped on the way.
fn extract_selectors(css: &str) -> (SelectorSet, usize) {
    let mut input = ParserInput::new(css);
    let mut parser = Parser::new(&mut input);
    let mut collector = SelectorCollector::default();
    let selectors = collector.collect_rules(&mut parser);
    (selectors.into_iter().collect(), collector.invalid_rules)
}

/// Extracts the selector set from CSS source text.
///
/// Never fails: invalid rules are skipped and logged.
pub fn parse_css_str(css: &str) -> SelectorSet {
    let (selectors, invalid_rules) = extract_selectors(css);
    if invalid_rules > 0 {
        debug!(invalid_rules, "some CSS rules could not be parsed");
    }
    selectors
}

/// Extracts the selector set from a CSS file.
///
/// Fails with `Io` when the file cannot be read and `Parse` when it is not
/// valid UTF-8.
pub fn parse_css(path: &Path) -> DeadcssResult<SelectorSet> {
    let bytes = fs::read(path).with_path(path)?;
    let css = String::from_utf8(bytes)
        .map_err(|e| DeadcssError::parse(path, format!("not valid UTF-8: {}", e)))?;

    let (selectors, invalid_rules) = extract_selectors(&css);
    if invalid_rules > 0 {
        warn!(
            path = %path.display(),
            invalid_rules,
            "skipped invalid CSS rules or declarations"
        );
    }
    if selectors.is_empty() && !css.trim().is_empty() {
        warn!(path = %path.display(), "no selectors found in non-empty CSS file");
    }
    Ok(selectors)
}
