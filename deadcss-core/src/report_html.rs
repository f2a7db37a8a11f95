//! Self-contained HTML report.
//!
//! No scripts and no external assets: the file can be attached to CI runs
//! or opened offline.
//!
//! - one section per stylesheet with a summary bar
//! - stage table (candidates in, candidates out, evidence counts)
//! - unused selector list
//! - skipped inputs

use std::fmt::Write as _;

use crate::builder::Report;
use crate::stages::StageResult;

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 2rem; background: #1e1e1e; color: #ddd; }
h1 { font-size: 1.4rem; }
h2 { font-size: 1.1rem; border-bottom: 1px solid #444; padding-bottom: .3rem; }
table { border-collapse: collapse; margin: .5rem 0 1rem; }
td, th { border: 1px solid #444; padding: .25rem .6rem; text-align: left; }
.bar { height: .5rem; background: #90EE90; width: 30rem; }
.bar > div { height: 100%; background: #F08080; }
ul.unused { font-family: ui-monospace, monospace; }
.muted { color: #888; }
"#;

/// Escapes text for HTML element content and attribute values.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn stage_evidence(stage: &StageResult) -> String {
    match stage {
        StageResult::DomMatching(dom) => format!(
            "{} documents, {} matched, {} not evaluable",
            dom.documents.len(),
            dom.matched_selectors.len(),
            dom.erroneous_selectors.len()
        ),
        StageResult::IdclassElimination(grep) => format!(
            "{} sources, {}/{} ids found, {}/{} classes found",
            grep.sources_scanned,
            grep.found_ids.len(),
            grep.ids.len(),
            grep.found_classes.len(),
            grep.classes.len()
        ),
    }
}

/// Renders the report as a standalone HTML page.
pub fn generate_html_report(report: &Report) -> String {
    // ~40 bytes per listed selector plus fixed overhead
    let mut out = String::with_capacity(4096 + report.unused_count() * 40);

    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<title>deadcss report</title>\n<style>");
    out.push_str(STYLE);
    out.push_str("</style>\n</head>\n<body>\n");
    let _ = writeln!(
        out,
        "<h1>Unused CSS selectors</h1>\n<p class=\"muted\">{} stylesheets, {} HTML documents, {} source files. Generated {}.</p>",
        report.css_file_count,
        report.html_file_count,
        report.source_file_count,
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    );

    for result in &report.results {
        let _ = writeln!(out, "<section>\n<h2>{}</h2>", escape(&result.css_file.display().to_string()));
        let _ = writeln!(
            out,
            "<p>{} of {} selectors unused ({:.1}%)</p>\n<div class=\"bar\"><div style=\"width: {:.1}%\"></div></div>",
            result.unused_selectors.len(),
            result.selectors.len(),
            result.unused_percentage(),
            result.unused_percentage()
        );

        if !result.stages.is_empty() {
            out.push_str("<table>\n<tr><th>Stage</th><th>In</th><th>Out</th><th>Evidence</th></tr>\n");
            for stage in &result.stages {
                let _ = writeln!(
                    out,
                    "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    stage.name(),
                    stage.candidates(),
                    stage.unused_selectors().len(),
                    escape(&stage_evidence(stage))
                );
            }
            out.push_str("</table>\n");
        }

        if result.unused_selectors.is_empty() {
            out.push_str("<p class=\"muted\">All selectors are possibly used.</p>\n");
        } else {
            out.push_str("<ul class=\"unused\">\n");
            for selector in &result.unused_selectors {
                let _ = writeln!(out, "<li>{}</li>", escape(selector));
            }
            out.push_str("</ul>\n");
        }
        out.push_str("</section>\n");
    }

    if !report.skipped.is_empty() {
        out.push_str("<section>\n<h2>Skipped inputs</h2>\n<ul>\n");
        for skipped in &report.skipped {
            let _ = writeln!(out, "<li>{}</li>", escape(&skipped.reason));
        }
        out.push_str("</ul>\n</section>\n");
    }

    out.push_str("</body>\n</html>\n");
    out
}
