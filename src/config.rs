//! Runtime configuration.
//!
//! Settings come from an optional YAML file and are then overridden by
//! command-line flags (which themselves may come from environment variables,
//! see [`crate::cli`]).
//!
//! ```yaml
//! api_key: "..."
//! base_url: "https://newsapi.org"
//! model_path: "./model/model.json"
//! page_size: 100
//! request_timeout_secs: 30
//! fallback: any_failure   # or rejection_only
//! keep_label: false
//! ```

use crate::api::DEFAULT_BASE_URL;
use crate::cli::Cli;
use crate::models::PAGE_SIZE;
use crate::planner::FallbackPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, instrument};

/// Default location of the model artifact.
pub const DEFAULT_MODEL_PATH: &str = "./model/model.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("missing required setting `{0}`")]
    Missing(&'static str),
}

/// Contents of the YAML config file. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model_path: Option<PathBuf>,
    pub page_size: Option<usize>,
    pub request_timeout_secs: Option<u64>,
    pub fallback: Option<FallbackPolicy>,
    pub keep_label: Option<bool>,
}

impl FileConfig {
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = serde_yaml::from_str(&raw)?;
        info!("Loaded configuration");
        Ok(config)
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_key: String,
    pub base_url: String,
    pub model_path: PathBuf,
    pub page_size: usize,
    pub request_timeout: Option<Duration>,
    pub fallback: FallbackPolicy,
    pub keep_label: bool,
}

impl Settings {
    /// Merge file settings with CLI overrides; the CLI wins.
    pub fn resolve(file: FileConfig, cli: &Cli) -> Result<Self, ConfigError> {
        let api_key = cli
            .api_key
            .clone()
            .or(file.api_key)
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::Missing("api_key"))?;

        Ok(Self {
            api_key,
            base_url: file
                .base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model_path: cli
                .model_path
                .clone()
                .or(file.model_path)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH)),
            page_size: file.page_size.unwrap_or(PAGE_SIZE).clamp(1, PAGE_SIZE),
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            fallback: cli.fallback.or(file.fallback).unwrap_or_default(),
            keep_label: cli.keep_label || file.keep_label.unwrap_or(false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use std::io::Write;

    /// Built directly so `env =` fallbacks on the flags are never consulted.
    fn cli() -> Cli {
        Cli {
            q: "climate".to_string(),
            from_date: String::new(),
            to_date: String::new(),
            config: None,
            api_key: None,
            model_path: None,
            format: OutputFormat::Json,
            output: None,
            keep_label: false,
            fallback: None,
        }
    }

    #[test]
    fn test_defaults_with_cli_api_key() {
        let args = Cli {
            api_key: Some("k".to_string()),
            ..cli()
        };
        let settings = Settings::resolve(FileConfig::default(), &args).unwrap();
        assert_eq!(settings.api_key, "k");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert_eq!(settings.page_size, PAGE_SIZE);
        assert_eq!(settings.request_timeout, None);
        assert_eq!(settings.fallback, FallbackPolicy::AnyFailure);
        assert!(!settings.keep_label);
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let file = FileConfig {
            api_key: Some("   ".to_string()),
            ..FileConfig::default()
        };
        let err = Settings::resolve(file, &cli()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("api_key")));
    }

    #[test]
    fn test_no_api_key_anywhere_is_an_error() {
        let err = Settings::resolve(FileConfig::default(), &cli()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("api_key")));
    }

    #[test]
    fn test_file_values_used_when_cli_is_silent() {
        let file = FileConfig {
            api_key: Some("from-file".to_string()),
            model_path: Some(PathBuf::from("/etc/model.json")),
            fallback: Some(FallbackPolicy::RejectionOnly),
            ..FileConfig::default()
        };
        let settings = Settings::resolve(file, &cli()).unwrap();
        assert_eq!(settings.api_key, "from-file");
        assert_eq!(settings.model_path, PathBuf::from("/etc/model.json"));
        assert_eq!(settings.fallback, FallbackPolicy::RejectionOnly);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = FileConfig {
            api_key: Some("from-file".to_string()),
            model_path: Some(PathBuf::from("/etc/model.json")),
            fallback: Some(FallbackPolicy::AnyFailure),
            ..FileConfig::default()
        };
        let args = Cli {
            api_key: Some("from-cli".to_string()),
            model_path: Some(PathBuf::from("/tmp/m.json")),
            fallback: Some(FallbackPolicy::RejectionOnly),
            ..cli()
        };
        let settings = Settings::resolve(file, &args).unwrap();
        assert_eq!(settings.api_key, "from-cli");
        assert_eq!(settings.model_path, PathBuf::from("/tmp/m.json"));
        assert_eq!(settings.fallback, FallbackPolicy::RejectionOnly);
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_key: abc\nbase_url: http://localhost:9000\npage_size: 250\nrequest_timeout_secs: 15\nfallback: rejection_only\nkeep_label: true"
        )
        .unwrap();

        let config = FileConfig::load(file.path()).unwrap();
        let settings = Settings::resolve(config, &cli()).unwrap();
        assert_eq!(settings.api_key, "abc");
        assert_eq!(settings.base_url, "http://localhost:9000");
        assert_eq!(settings.page_size, PAGE_SIZE);
        assert_eq!(settings.request_timeout, Some(Duration::from_secs(15)));
        assert_eq!(settings.fallback, FallbackPolicy::RejectionOnly);
        assert!(settings.keep_label);
    }

    #[test]
    fn test_unknown_key_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_keys: typo").unwrap();
        assert!(matches!(FileConfig::load(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        assert!(matches!(
            FileConfig::load("/no/such/config.yaml"),
            Err(ConfigError::Io { .. })
        ));
    }
}
