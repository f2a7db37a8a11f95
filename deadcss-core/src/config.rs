//! Configuration loading from deadcss.toml.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

use crate::error::{DeadcssError, IoResultExt};

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "deadcss.toml";

/// Main configuration structure for deadcss.toml.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct DeadcssConfig {
    /// Selector patterns to leave out of the unused report.
    pub ignore: Option<Vec<String>>,
    /// Directory names to skip while collecting files.
    pub exclude: Option<Vec<String>>,
    /// File extension overrides per input category.
    pub extensions: Option<ExtensionsConfig>,
    /// Output configuration.
    pub output: Option<OutputConfig>,
}

/// Extension lists per input category (e.g. `[".js", ".php"]`).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ExtensionsConfig {
    pub css: Option<Vec<String>>,
    pub html: Option<Vec<String>>,
    pub source: Option<Vec<String>>,
}

/// Output format configuration.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format: "plain" or "json".
    pub format: Option<String>,
}

impl OutputConfig {
    /// Whether the configured format asks for JSON output.
    pub fn is_json(&self) -> bool {
        self.format
            .as_deref()
            .is_some_and(|f| f.eq_ignore_ascii_case("json"))
    }
}

/// Loads `deadcss.toml` from the given directory if it exists.
pub fn load_config(dir: &Path) -> Result<Option<DeadcssConfig>> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        return Ok(None);
    }
    load_config_file(&path).map(Some)
}

/// Loads an explicitly named configuration file.
///
/// Malformed TOML and unknown keys surface as [`DeadcssError::Config`].
pub fn load_config_file(path: &Path) -> Result<DeadcssConfig> {
    let content = fs::read_to_string(path)
        .with_path(path)
        .context("Failed to read config file")?;
    let cfg = toml::from_str(&content)
        .map_err(|e| DeadcssError::config(path, e.message()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir()
            .join("deadcss_config_test")
            .join(format!("{}_{}", name, std::process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).ok();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_missing_config_is_none() {
        let dir = temp_dir("missing");
        assert!(load_config(&dir).unwrap().is_none());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let dir = temp_dir("full");
        fs::write(
            dir.join(CONFIG_FILE_NAME),
            r#"
ignore = ["js-*", ".is-active"]
exclude = ["vendor"]

[extensions]
source = [".js", ".twig"]

[output]
format = "JSON"
"#,
        )
        .unwrap();

        let cfg = load_config(&dir).unwrap().unwrap();
        assert_eq!(cfg.ignore.unwrap(), vec!["js-*", ".is-active"]);
        assert_eq!(cfg.exclude.unwrap(), vec!["vendor"]);
        let ext = cfg.extensions.unwrap();
        assert!(ext.css.is_none());
        assert_eq!(ext.source.unwrap(), vec![".js", ".twig"]);
        assert!(cfg.output.unwrap().is_json());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_config_is_error() {
        let dir = temp_dir("invalid");
        fs::write(dir.join(CONFIG_FILE_NAME), "ignore = 42").unwrap();
        let err = load_config(&dir).unwrap_err();
        let config_err = err.downcast_ref::<DeadcssError>().unwrap();
        assert!(matches!(config_err, DeadcssError::Config { .. }));
        assert_eq!(config_err.path(), Some(&dir.join(CONFIG_FILE_NAME)));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_key_is_config_error() {
        let dir = temp_dir("unknown_key");
        fs::write(dir.join(CONFIG_FILE_NAME), "ignored = [\".a\"]").unwrap();
        let err = load_config_file(&dir.join(CONFIG_FILE_NAME)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DeadcssError>(),
            Some(DeadcssError::Config { .. })
        ));
        fs::remove_dir_all(&dir).ok();
    }
}
