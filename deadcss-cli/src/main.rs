//! deadcss CLI - find CSS selectors that nothing on a site uses.
//!
//! Features:
//! - Recursive discovery of stylesheets, HTML documents and other sources
//! - DOM matching against static HTML
//! - Whole-word id/class search in templates and scripts
//! - Plain, JSON and standalone HTML reports
//! - Optional deadcss.toml configuration

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use deadcss_core::{
    generate_html_report, init_logging, load_config, load_config_file, print_json, print_plain,
    write_json, Deadcss, DeadcssConfig, Report, DEFAULT_CSS_EXTENSIONS, DEFAULT_HTML_EXTENSIONS,
    DEFAULT_SOURCE_EXTENSIONS,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Find CSS selectors that no HTML page or source file uses"
)]
pub struct Cli {
    /// Files and directories to scan for CSS, HTML and source files
    #[arg(required = true, value_name = "PATHS")]
    paths: Vec<PathBuf>,

    /// Output results in JSON format
    #[arg(long)]
    json: bool,

    /// Also write the JSON report to a file
    #[arg(long, value_name = "FILE")]
    json_export: Option<String>,

    /// Write a standalone HTML report to a file
    #[arg(long, value_name = "FILE")]
    html_export: Option<String>,

    /// Log debug details to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,

    /// Stylesheet extensions (comma separated, replaces the defaults)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    css_ext: Vec<String>,

    /// HTML document extensions (comma separated, replaces the defaults)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    html_ext: Vec<String>,

    /// Extensions of other sources searched for ids and classes
    /// (comma separated, replaces the defaults)
    #[arg(long, value_name = "EXT", value_delimiter = ',')]
    src_ext: Vec<String>,

    /// Directory names to skip
    #[arg(long, value_name = "DIR", value_delimiter = ',')]
    exclude: Vec<String>,

    /// Selector patterns to leave out of the report (`prefix*`, `*suffix`, substring)
    #[arg(long, value_name = "PATTERN", value_delimiter = ',')]
    ignore: Vec<String>,

    /// Skip DOM matching against HTML documents
    #[arg(long)]
    no_dom: bool,

    /// Skip the id/class search in other sources
    #[arg(long)]
    no_grep: bool,

    /// Configuration file (defaults to ./deadcss.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Exit with code 1 when unused selectors remain
    #[arg(long)]
    strict: bool,
}

/// Effective options after merging the command line over the config file.
#[derive(Debug, Default, PartialEq)]
struct Settings {
    css_ext: Vec<String>,
    html_ext: Vec<String>,
    src_ext: Vec<String>,
    exclude: Vec<String>,
    ignore: Vec<String>,
    json: bool,
}

fn or_defaults(cli: &[String], config: Option<&Vec<String>>, defaults: &[&str]) -> Vec<String> {
    if !cli.is_empty() {
        cli.to_vec()
    } else if let Some(list) = config {
        list.clone()
    } else {
        defaults.iter().map(|s| s.to_string()).collect()
    }
}

/// Extension flags replace config values; excludes and ignores accumulate.
fn merge_settings(cli: &Cli, config: Option<DeadcssConfig>) -> Settings {
    let config = config.unwrap_or_default();
    let exts = config.extensions.unwrap_or_default();

    let mut exclude = config.exclude.unwrap_or_default();
    exclude.extend(cli.exclude.iter().cloned());
    let mut ignore = config.ignore.unwrap_or_default();
    ignore.extend(cli.ignore.iter().cloned());

    Settings {
        css_ext: or_defaults(&cli.css_ext, exts.css.as_ref(), DEFAULT_CSS_EXTENSIONS),
        html_ext: or_defaults(&cli.html_ext, exts.html.as_ref(), DEFAULT_HTML_EXTENSIONS),
        src_ext: or_defaults(&cli.src_ext, exts.source.as_ref(), DEFAULT_SOURCE_EXTENSIONS),
        exclude,
        ignore,
        json: cli.json || config.output.is_some_and(|o| o.is_json()),
    }
}

/// Loads the explicit config file, or deadcss.toml from the working
/// directory. Broken configs are reported and ignored.
fn load_settings_config(cli: &Cli) -> Option<DeadcssConfig> {
    let loaded = match &cli.config {
        Some(path) => load_config_file(path).map(Some),
        None => std::env::current_dir()
            .context("Failed to read current directory")
            .and_then(|cwd| load_config(&cwd)),
    };
    match loaded {
        Ok(config) => config,
        Err(e) => {
            eprintln!("[WARN] config load failed: {:#}", e);
            None
        }
    }
}

/// Security: Validates export file paths.
///
/// Rejects:
/// - Paths with null bytes
/// - Paths containing `..` (parent directory traversal)
fn validate_output_path(path: &str) -> Result<PathBuf> {
    if path.contains('\0') {
        return Err(anyhow!("Output path contains null bytes"));
    }

    let p = PathBuf::from(path);
    if p.components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
    {
        return Err(anyhow!(
            "Path traversal (..) not allowed in output paths: {}",
            path
        ));
    }

    // Windows separators are not components on unix
    let normalized = path.replace('\\', "/");
    if normalized.split('/').any(|segment| segment == "..") {
        return Err(anyhow!("Path traversal attempt detected: {}", path));
    }

    Ok(p)
}

/// Writes the requested export files.
///
/// Returns an error only for rejected paths; write failures are warnings.
fn write_exports(cli: &Cli, report: &Report) -> Result<()> {
    if let Some(ref file) = cli.json_export {
        let path = validate_output_path(file)?;
        match write_json(report, &path) {
            Ok(()) => eprintln!("JSON report saved to: {}", path.display()),
            Err(e) => eprintln!("[WARN] JSON write failed to {}: {}", path.display(), e),
        }
    }

    if let Some(ref file) = cli.html_export {
        let path = validate_output_path(file)?;
        match fs::write(&path, generate_html_report(report)) {
            Ok(()) => eprintln!("HTML report saved to: {}", path.display()),
            Err(e) => eprintln!("[WARN] HTML write failed to {}: {}", path.display(), e),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("[PANIC] deadcss internal error: {}", info);
        eprintln!("[PANIC] The process will exit with code 2.");
        std::process::exit(2);
    }));

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let settings = merge_settings(&cli, load_settings_config(&cli));

    let report = Deadcss::new(cli.paths.iter().cloned())
        .css_extensions(settings.css_ext.iter().cloned())
        .html_extensions(settings.html_ext.iter().cloned())
        .source_extensions(settings.src_ext.iter().cloned())
        .exclude_dirs(settings.exclude.iter().cloned())
        .ignore_patterns(settings.ignore.iter().cloned())
        .with_dom(!cli.no_dom)
        .with_grep(!cli.no_grep)
        .analyze();

    let report = match report {
        Ok(report) => report,
        Err(e) => {
            eprintln!("[ERROR] {:#}", e);
            std::process::exit(2);
        }
    };

    if settings.json {
        print_json(&report);
    } else {
        print_plain(&report);
    }

    if let Err(e) = write_exports(&cli, &report) {
        eprintln!("[ERROR] Invalid output path: {}", e);
        std::process::exit(2);
    }

    std::process::exit(if cli.strict && report.has_unused() { 1 } else { 0 });
}
