//! Output formatting - plaintext and JSON.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::builder::Report;
use crate::error::{DeadcssError, DeadcssResult, IoResultExt};
use crate::stages::StageResult;

/// Width of the per-file header rule in plain output.
const HEADER_WIDTH: usize = 80;

/// Renders the report as plain text.
///
/// One section per stylesheet listing the selectors whose usage could not
/// be determined, preceded by a one-line summary per stage.
pub fn render_plain(report: &Report) -> String {
    let mut out = String::new();

    if report.results.is_empty() {
        out.push_str("No CSS files analyzed.\n");
    }

    for result in &report.results {
        let header = format!("{} ", result.css_file.display());
        let _ = writeln!(out, "{:-<width$}", header, width = HEADER_WIDTH);

        for stage in &result.stages {
            let _ = writeln!(
                out,
                "  {}: {} -> {} candidates",
                stage.name(),
                stage.candidates(),
                stage.unused_selectors().len()
            );
            if let StageResult::DomMatching(dom) = stage {
                if !dom.erroneous_selectors.is_empty() {
                    let _ = writeln!(
                        out,
                        "  ({} selectors could not be evaluated against HTML)",
                        dom.erroneous_selectors.len()
                    );
                }
            }
        }

        if result.unused_selectors.is_empty() {
            out.push_str("All CSS selectors are possibly used.\n");
        } else {
            let _ = writeln!(
                out,
                "Could not determine usage of the following CSS selectors ({} of {}):",
                result.unused_selectors.len(),
                result.selectors.len()
            );
            for selector in &result.unused_selectors {
                let _ = writeln!(out, "{}", selector);
            }
        }
        out.push('\n');
    }

    if !report.skipped.is_empty() {
        let _ = writeln!(out, "SKIPPED INPUTS ({}):", report.skipped.len());
        for skipped in &report.skipped {
            let _ = writeln!(out, "- {}", skipped.reason);
        }
    }

    out
}

/// Renders the report as pretty-printed JSON.
pub fn render_json(report: &Report) -> DeadcssResult<String> {
    serde_json::to_string_pretty(report).map_err(|e| DeadcssError::Internal {
        message: format!("JSON serialization failed: {}", e),
    })
}

/// Prints the report in plain text format.
pub fn print_plain(report: &Report) {
    print!("{}", render_plain(report));
}

/// Prints the report in JSON format.
///
/// Falls back to the plain report if serialization fails.
pub fn print_json(report: &Report) {
    match render_json(report) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            tracing::warn!(error = %e, "JSON serialization failed, printing plain report");
            print_plain(report);
        }
    }
}

/// Writes the JSON report to a file.
pub fn write_json(report: &Report, path: &Path) -> DeadcssResult<()> {
    let json = render_json(report)?;
    fs::write(path, json).with_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::SkippedInput;
    use crate::dom::HtmlDocument;
    use crate::pipeline::analyze;
    use crate::source::SourceFile;
    use crate::SelectorSet;
    use std::path::PathBuf;

    fn sample_report() -> Report {
        let selectors: SelectorSet = ["#a", ".b", "div"].iter().map(|s| s.to_string()).collect();
        let docs = [HtmlDocument::parse("index.html", "<p id=\"a\"></p>")];
        let sources = [SourceFile::new("app.js", "b")];
        let result = analyze("style.css", selectors, &docs, &sources);

        Report {
            generated_at: chrono::Utc::now(),
            css_file_count: 1,
            html_file_count: 1,
            source_file_count: 1,
            results: vec![result],
            skipped: vec![SkippedInput {
                path: Some(PathBuf::from("broken.html")),
                reason: "Parse error in broken.html: not valid UTF-8".to_string(),
            }],
        }
    }

    #[test]
    fn test_plain_lists_unused() {
        let text = render_plain(&sample_report());
        assert!(text.starts_with("style.css ---"));
        assert!(text.contains("Could not determine usage of the following CSS selectors (1 of 3):\ndiv\n"));
        assert!(text.contains("DOM matching: 3 -> 2 candidates"));
        assert!(text.contains("id/class elimination: 2 -> 1 candidates"));
        assert!(text.contains("SKIPPED INPUTS (1):"));
    }

    #[test]
    fn test_json_structure() {
        let json = render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let result = &value["results"][0];
        assert_eq!(result["css_file"], "style.css");
        assert_eq!(result["unused_selectors"], serde_json::json!(["div"]));
        assert_eq!(result["stages"][0]["stage"], "dom_matching");
        assert_eq!(result["stages"][1]["stage"], "idclass_elimination");
        assert_eq!(result["stages"][1]["found_classes"], serde_json::json!(["b"]));
        assert_eq!(value["skipped"][0]["path"], "broken.html");
    }

    #[test]
    fn test_empty_report() {
        let report = Report {
            generated_at: chrono::Utc::now(),
            css_file_count: 0,
            html_file_count: 0,
            source_file_count: 0,
            results: Vec::new(),
            skipped: Vec::new(),
        };
        assert_eq!(render_plain(&report), "No CSS files analyzed.\n");
    }
}
