//! End-to-end test suite for deadcss-core.

use crate::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

fn write_file(file: &Path, content: impl AsRef<[u8]>) {
    fs::create_dir_all(file.parent().unwrap()).unwrap();
    fs::write(file, content).unwrap();
}

fn setup_temp_site() -> PathBuf {
    let id = TEST_COUNTER.fetch_add(1, Ordering::SeqCst);
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let dir = std::env::temp_dir()
        .join("deadcss_tests")
        .join(format!("{}_{}", timestamp, id));

    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn set(items: &[&str]) -> SelectorSet {
    items.iter().map(|s| s.to_string()).collect()
}

fn only_result(report: &Report) -> &AnalysisResult {
    assert_eq!(report.results.len(), 1, "expected exactly one stylesheet");
    &report.results[0]
}

// Scenario: DOM clears the id, grep clears the class
#[test]
fn test_dom_then_grep_scenario() {
    let root = setup_temp_site();
    write_file(&root.join("css/site.css"), "#a { color: red }\n.b { margin: 0 }\ndiv { padding: 0 }\n");
    write_file(&root.join("index.html"), "<html><body><section id=\"a\"></section></body></html>");
    write_file(&root.join("app.js"), "document.body.classList.toggle(\"b\");");

    let report = Deadcss::new([&root]).analyze().unwrap();
    let result = only_result(&report);

    assert_eq!(result.selectors, set(&["#a", ".b", "div"]));
    assert_eq!(result.stages.len(), 2);
    assert_eq!(result.stages[0].unused_selectors(), &set(&[".b", "div"]));
    assert_eq!(result.stages[1].unused_selectors(), &set(&["div"]));
    assert_eq!(result.unused_selectors, set(&["div"]));

    fs::remove_dir_all(&root).ok();
}

// Scenario: one identifier hit is enough to clear a compound selector
#[test]
fn test_compound_selector_cleared_by_one_identifier() {
    let root = setup_temp_site();
    write_file(&root.join("main.css"), "#nav .item { display: block }");
    write_file(&root.join("header.php"), "<?php echo '<div id=\"nav\">'; ?>");

    let report = Deadcss::new([&root]).analyze().unwrap();
    let result = only_result(&report);

    assert!(result.unused_selectors.is_empty());
    let StageResult::IdclassElimination(grep) = &result.stages[0] else {
        panic!("expected only the id/class stage");
    };
    assert_eq!(grep.unfindable_classes.iter().collect::<Vec<_>>(), vec!["item"]);

    fs::remove_dir_all(&root).ok();
}

// Scenario: a selector the DOM engine rejects stays a candidate
#[test]
fn test_unevaluable_selector_stays_candidate() {
    let root = setup_temp_site();
    write_file(&root.join("main.css"), "a:frobnicate { color: red }\n.menu:frobnicate { color: blue }");
    write_file(&root.join("one.html"), "<a class=\"menu\" href=\"#\">x</a>");
    write_file(&root.join("two.html"), "<a href=\"#\">y</a>");
    write_file(&root.join("menu.rb"), "link_to 'x', class: 'menu'");

    let report = Deadcss::new([&root]).analyze().unwrap();
    let result = only_result(&report);

    let StageResult::DomMatching(dom) = &result.stages[0] else {
        panic!("expected DOM stage first");
    };
    assert_eq!(dom.erroneous_selectors.len(), 2);
    assert_eq!(dom.unused_selectors.len(), 2);
    // The grep stage still sees both and clears the one naming a class
    assert_eq!(result.unused_selectors, set(&["a:frobnicate"]));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_no_html_or_sources_reports_everything() {
    let root = setup_temp_site();
    write_file(&root.join("a.css"), "h1, h2 { margin: 0 } .x { }");

    let report = Deadcss::new([&root]).analyze().unwrap();
    let result = only_result(&report);

    assert!(result.stages.is_empty());
    assert_eq!(result.unused_selectors, set(&[".x", "h1", "h2"]));
    assert_eq!(report.html_file_count, 0);
    assert_eq!(report.source_file_count, 0);

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_each_stylesheet_analyzed_independently() {
    let root = setup_temp_site();
    write_file(&root.join("a.css"), ".shared { } .only-a { }");
    write_file(&root.join("b.css"), ".shared { } .only-b { }");
    write_file(&root.join("page.html"), "<p class=\"shared\"></p>");

    let report = Deadcss::new([&root]).analyze().unwrap();

    assert_eq!(report.results.len(), 2);
    assert!(report.results[0].css_file.ends_with("a.css"));
    assert_eq!(report.results[0].unused_selectors, set(&[".only-a"]));
    assert!(report.results[1].css_file.ends_with("b.css"));
    assert_eq!(report.results[1].unused_selectors, set(&[".only-b"]));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_state_pseudo_classes_match_static_documents() {
    let root = setup_temp_site();
    write_file(
        &root.join("main.css"),
        "a:hover { } li::before { } input:focus-visible { } p:hover { }",
    );
    write_file(&root.join("index.html"), "<a href=\"/\">x</a><ul><li>1</li></ul><input>");

    let report = Deadcss::new([&root]).analyze().unwrap();
    assert_eq!(only_result(&report).unused_selectors, set(&["p:hover"]));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_media_rules_are_analyzed() {
    let root = setup_temp_site();
    write_file(
        &root.join("main.css"),
        "@media (max-width: 600px) { .mobile-nav { } }\n@font-face { font-family: X; }\n",
    );

    let report = Deadcss::new([&root]).analyze().unwrap();
    assert_eq!(only_result(&report).selectors, set(&[".mobile-nav"]));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_nested_rules_are_analyzed() {
    let root = setup_temp_site();
    write_file(
        &root.join("menu.css"),
        ".menu { display: flex; .item { color: red } &:hover { color: blue } .ghost { } }\n",
    );
    write_file(
        &root.join("index.html"),
        "<nav class=\"menu\"><a class=\"item\" href=\"/\">x</a></nav>",
    );

    let report = Deadcss::new([&root]).analyze().unwrap();
    let result = only_result(&report);

    assert_eq!(
        result.selectors,
        set(&[".menu", ".menu .ghost", ".menu .item", ".menu:hover"])
    );
    assert_eq!(result.unused_selectors, set(&[".menu .ghost"]));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_extension_filter_is_case_insensitive() {
    let root = setup_temp_site();
    write_file(&root.join("MAIN.CSS"), ".hero { }");
    write_file(&root.join("Index.HTML"), "<div class=\"hero\"></div>");

    let report = Deadcss::new([&root]).analyze().unwrap();
    assert_eq!(report.html_file_count, 1);
    assert!(only_result(&report).unused_selectors.is_empty());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_custom_source_extensions() {
    let root = setup_temp_site();
    write_file(&root.join("main.css"), ".card { } .banner { }");
    write_file(&root.join("views/card.twig"), "<div class=\"{{ 'card' }}\"></div>");
    write_file(&root.join("app.js"), "banner()");

    let report = Deadcss::new([&root])
        .source_extensions([".twig"])
        .analyze()
        .unwrap();

    // app.js is no longer searched
    assert_eq!(report.source_file_count, 1);
    assert_eq!(only_result(&report).unused_selectors, set(&[".banner"]));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_excluded_directories_are_not_searched() {
    let root = setup_temp_site();
    write_file(&root.join("main.css"), ".widget { }");
    write_file(&root.join("vendor/lib.js"), "widget");
    write_file(&root.join(".git/hooks/pre-commit.js"), "widget");

    let report = Deadcss::new([&root]).exclude_dirs(["vendor"]).analyze().unwrap();
    assert_eq!(report.source_file_count, 0);
    assert_eq!(only_result(&report).unused_selectors, set(&[".widget"]));

    let report = Deadcss::new([&root]).analyze().unwrap();
    assert_eq!(report.source_file_count, 1);
    assert!(only_result(&report).unused_selectors.is_empty());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_seed_files_and_directories_mix() {
    let root = setup_temp_site();
    write_file(&root.join("css/main.css"), ".promo { }");
    write_file(&root.join("templates/promo.tpl"), "{include file='promo'}");
    write_file(&root.join("unrelated/other.css"), ".other { }");

    let report = Deadcss::new([root.join("css/main.css"), root.join("templates")])
        .analyze()
        .unwrap();
    assert!(only_result(&report).unused_selectors.is_empty());

    fs::remove_dir_all(&root).ok();
}

// Error isolation: broken inputs are skipped, the rest is analyzed
#[test]
fn test_non_utf8_inputs_are_skipped() {
    let root = setup_temp_site();
    write_file(&root.join("good.css"), ".ok { } .gone { }");
    write_file(&root.join("bad.css"), [0x2eu8, 0x61, 0xff, 0xfe, 0x7b, 0x7d]);
    write_file(&root.join("bad.html"), [0x3cu8, 0x70, 0x3e, 0xc3, 0x28]);
    write_file(&root.join("good.html"), "<i class=\"ok\"></i>");

    let report = Deadcss::new([&root]).analyze().unwrap();

    assert_eq!(report.css_file_count, 2);
    assert_eq!(report.html_file_count, 1);
    assert_eq!(only_result(&report).unused_selectors, set(&[".gone"]));
    assert_eq!(report.skipped.len(), 2);
    assert!(report
        .skipped
        .iter()
        .all(|s| s.path.as_ref().is_some_and(|p| p.file_stem().unwrap() == "bad")));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_non_utf8_source_is_still_searched() {
    let root = setup_temp_site();
    write_file(&root.join("main.css"), ".legacy { }");
    // Latin-1 encoded template
    write_file(&root.join("old.php"), b"<p class=\"legacy\">caf\xe9</p>".as_slice());

    let report = Deadcss::new([&root]).analyze().unwrap();
    assert!(report.skipped.is_empty());
    assert!(only_result(&report).unused_selectors.is_empty());

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_invalid_rule_keeps_valid_neighbours() {
    let root = setup_temp_site();
    write_file(&root.join("main.css"), ".one { } .two) { } .three { }");

    let report = Deadcss::new([&root]).analyze().unwrap();
    assert_eq!(only_result(&report).selectors, set(&[".one", ".three"]));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_report_json_round_trips_through_value() {
    let root = setup_temp_site();
    write_file(&root.join("main.css"), "#a { } .b { }");
    write_file(&root.join("index.html"), "<b id=\"a\"></b>");

    let report = Deadcss::new([&root]).analyze().unwrap();
    let json = render_json(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["css_file_count"], 1);
    assert_eq!(value["results"][0]["unused_selectors"], serde_json::json!([".b"]));
    assert_eq!(
        value["results"][0]["stages"][0]["documents"][0]["matched"],
        1
    );

    let out = root.join("report.json");
    write_json(&report, &out).unwrap();
    assert!(fs::read_to_string(&out).unwrap().contains("\".b\""));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_config_drives_builder() {
    let root = setup_temp_site();
    write_file(
        &root.join(CONFIG_FILE_NAME),
        "ignore = [\".is-*\"]\n[extensions]\nsource = [\".vue\"]\n",
    );
    write_file(&root.join("main.css"), ".is-open { } .panel { } .tab { }");
    write_file(&root.join("Panel.vue"), "<div class=\"panel\"></div>");

    let config = load_config(&root).unwrap().unwrap();
    let sources = config
        .extensions
        .as_ref()
        .and_then(|e| e.source.clone())
        .unwrap();

    let report = Deadcss::new([&root])
        .source_extensions(sources)
        .ignore_patterns(config.ignore.clone().unwrap_or_default())
        .analyze()
        .unwrap();
    assert_eq!(only_result(&report).unused_selectors, set(&[".tab"]));

    fs::remove_dir_all(&root).ok();
}

#[test]
fn test_stage_sets_are_monotonic_end_to_end() {
    let root = setup_temp_site();
    write_file(
        &root.join("main.css"),
        "body { } .a { } .b { } #c { } #d .e { } ul li { } .f:hover { }",
    );
    write_file(&root.join("index.html"), "<body><ul><li class=\"f\"></li></ul></body>");
    write_file(&root.join("x.js"), "const a = 1; // e");

    let report = Deadcss::new([&root]).analyze().unwrap();
    let result = only_result(&report);

    let mut before = result.selectors.clone();
    for stage in &result.stages {
        assert_eq!(stage.candidates(), before.len());
        assert!(stage.unused_selectors().is_subset(&before));
        before = stage.unused_selectors().clone();
    }
    assert_eq!(before, result.unused_selectors);
    assert_eq!(result.unused_selectors, set(&["#c", ".b"]));

    fs::remove_dir_all(&root).ok();
}
