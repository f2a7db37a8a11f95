//! Id/class elimination: clear selectors whose ids or classes occur as
//! whole words in some source file.
//!
//! This is a heuristic over-approximation of "possibly used": a word hit
//! proves nothing about how the name is used (markup built in a script, a
//! comment, an unrelated string), but it catches dynamically generated
//! markup no DOM matcher can see.
//!
//! A selector is cleared as soon as *any* of its identifiers is found.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::extract::{extract_identifiers, Identifier};
use crate::source::SourceFile;
use crate::SelectorSet;

/// Result of the id/class elimination stage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GrepStageResult {
    /// Size of the input candidate set
    pub candidates: usize,
    /// Number of source files searched
    pub sources_scanned: usize,
    /// Ids extracted from the candidates
    pub ids: BTreeSet<String>,
    /// Classes extracted from the candidates
    pub classes: BTreeSet<String>,
    /// Ids found as a word in some source
    pub found_ids: BTreeSet<String>,
    /// Classes found as a word in some source
    pub found_classes: BTreeSet<String>,
    /// Ids found nowhere
    pub unfindable_ids: BTreeSet<String>,
    /// Classes found nowhere
    pub unfindable_classes: BTreeSet<String>,
    /// Candidates owning at least one found identifier
    pub possibly_used: SelectorSet,
    /// Candidates left over
    pub unused_selectors: SelectorSet,
}

/// Moves every name of `unfindable` that is a word of the source to `found`.
fn move_found(
    unfindable: &mut BTreeSet<String>,
    found: &mut BTreeSet<String>,
    words: &HashSet<String>,
) {
    let hits: Vec<String> = unfindable
        .iter()
        .filter(|name| words.contains(name.as_str()))
        .cloned()
        .collect();
    for name in hits {
        unfindable.remove(&name);
        found.insert(name);
    }
}

/// Removes every candidate owning an id or class that occurs as a whole
/// word in any of the sources.
///
/// The input set is not modified; the result carries the remaining set.
pub fn eliminate_by_grep(candidates: &SelectorSet, sources: &[SourceFile]) -> GrepStageResult {
    let extraction = extract_identifiers(candidates);
    info!(
        selectors = candidates.len(),
        ids = extraction.ids.len(),
        classes = extraction.classes.len(),
        "extracted ids and classes for source matching"
    );
    debug!(ids = ?extraction.ids, classes = ?extraction.classes, "extracted identifiers");

    let mut unfindable_ids = extraction.ids.clone();
    let mut unfindable_classes = extraction.classes.clone();
    let mut found_ids = BTreeSet::new();
    let mut found_classes = BTreeSet::new();
    let mut sources_scanned = 0;

    for source in sources {
        if unfindable_ids.is_empty() && unfindable_classes.is_empty() {
            debug!(path = %source.path().display(), "all identifiers found, skipping source");
            continue;
        }
        debug!(
            path = %source.path().display(),
            ids = unfindable_ids.len(),
            classes = unfindable_classes.len(),
            "searching remaining unfindable identifiers"
        );

        move_found(&mut unfindable_ids, &mut found_ids, source.words());
        move_found(&mut unfindable_classes, &mut found_classes, source.words());
        sources_scanned += 1;
    }

    let found = found_ids
        .iter()
        .map(|id| Identifier::Id(id.clone()))
        .chain(found_classes.iter().map(|class| Identifier::Class(class.clone())));
    let mut possibly_used = SelectorSet::new();
    for identifier in found {
        possibly_used.extend(extraction.origins_of(&identifier).iter().cloned());
    }

    let unused_selectors: SelectorSet = candidates.difference(&possibly_used).cloned().collect();
    info!(
        selectors = candidates.len(),
        sources = sources.len(),
        possibly_used = possibly_used.len(),
        unused = unused_selectors.len(),
        "id/class based elimination done"
    );

    GrepStageResult {
        candidates: candidates.len(),
        sources_scanned,
        ids: extraction.ids,
        classes: extraction.classes,
        found_ids,
        found_classes,
        unfindable_ids,
        unfindable_classes,
        possibly_used,
        unused_selectors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> SelectorSet {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn names(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_found_class_clears_selector() {
        let sources = [SourceFile::new("app.js", "el.classList.add('b');")];
        let result = eliminate_by_grep(&set(&[".b", "div"]), &sources);

        assert_eq!(result.unused_selectors, set(&["div"]));
        assert_eq!(result.found_classes, names(&["b"]));
        assert_eq!(result.possibly_used, set(&[".b"]));
    }

    #[test]
    fn test_any_identifier_clears_compound_selector() {
        let sources = [SourceFile::new("nav.php", "<?php echo '<ul id=\"nav\">'; ?>")];
        let result = eliminate_by_grep(&set(&["#nav .item"]), &sources);

        assert!(result.unused_selectors.is_empty());
        assert_eq!(result.found_ids, names(&["nav"]));
        assert_eq!(result.unfindable_classes, names(&["item"]));
    }

    #[test]
    fn test_missing_word_keeps_selector() {
        let sources = [SourceFile::new("a.py", "render('items', navigation=True)")];
        let result = eliminate_by_grep(&set(&["#nav", ".item", "#nav.item"]), &sources);

        assert_eq!(result.unused_selectors, set(&["#nav", "#nav.item", ".item"]));
        assert!(result.found_ids.is_empty());
        assert!(result.found_classes.is_empty());
    }

    #[test]
    fn test_id_word_also_clears_same_named_class() {
        // The search is over plain words: "x" clears both #x and .x
        let sources = [SourceFile::new("t.tpl", "{{ x }}")];
        let result = eliminate_by_grep(&set(&["#x", ".x"]), &sources);
        assert!(result.unused_selectors.is_empty());
    }

    #[test]
    fn test_found_identifiers_not_searched_again() {
        let sources = [
            SourceFile::new("1.js", "a"),
            SourceFile::new("2.js", "b"),
            SourceFile::new("3.js", "c"),
        ];
        let result = eliminate_by_grep(&set(&[".a", ".b"]), &sources);

        assert!(result.unused_selectors.is_empty());
        // Third file is skipped: nothing left to find
        assert_eq!(result.sources_scanned, 2);
    }

    #[test]
    fn test_sources_are_shared_across_stylesheets() {
        // One tokenized source list serves every stylesheet's candidates
        let sources = [
            SourceFile::new("app.js", "toggle('open'); show('modal-body')"),
            SourceFile::new("view.twig", "<div id=\"main\">"),
        ];

        let first = eliminate_by_grep(&set(&[".open", "#main", ".closed"]), &sources);
        let second = eliminate_by_grep(&set(&[".modal-body", "#main .open", "#footer"]), &sources);

        assert_eq!(first.unused_selectors, set(&[".closed"]));
        assert_eq!(first.found_ids, names(&["main"]));
        assert_eq!(second.unused_selectors, set(&["#footer"]));
        assert_eq!(second.found_classes, names(&["modal", "open"]));
        assert_eq!(sources[0].words().len(), 5);
    }

    #[test]
    fn test_selector_without_identifiers_survives() {
        let sources = [SourceFile::new("a.js", "div span table")];
        let result = eliminate_by_grep(&set(&["div", "span > table"]), &sources);
        assert_eq!(result.unused_selectors, set(&["div", "span > table"]));
        assert_eq!(result.sources_scanned, 0);
    }

    #[test]
    fn test_remaining_is_subset_of_candidates() {
        let sources = [SourceFile::new("a.js", "one two three")];
        let candidates = set(&[".one", "#two", ".four", "p"]);
        let result = eliminate_by_grep(&candidates, &sources);

        assert!(result.unused_selectors.is_subset(&candidates));
        assert_eq!(result.unused_selectors, set(&[".four", "p"]));
    }
}
