//! Configuration loading from TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use pubrecon_apply::{ApplyOptions, DELETE_THRESHOLD};
use pubrecon_core::{
    FALLBACK_TITLE_THRESHOLD, FallbackMode, JOURNAL_TITLE_THRESHOLD, NAME_THRESHOLD,
    PublicationMatcher, RetryPolicy,
};
use serde::Deserialize;

/// Global configuration for pubrecon
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub matching: MatchingConfig,
    pub pubmed: PubmedConfig,
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data/pubrecon.duckdb"),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    pub name_threshold: f64,
    pub journal_title_threshold: f64,
    pub fallback_title_threshold: f64,
    pub delete_threshold: f64,
    pub fallback: FallbackMode,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            name_threshold: NAME_THRESHOLD,
            journal_title_threshold: JOURNAL_TITLE_THRESHOLD,
            fallback_title_threshold: FALLBACK_TITLE_THRESHOLD,
            delete_threshold: DELETE_THRESHOLD,
            fallback: FallbackMode::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PubmedConfig {
    pub base_url: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub email: Option<String>,
    pub tool: String,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub api_key: Option<String>,
    pub max_results: usize,
    pub batch_size: usize,
}

impl Default for PubmedConfig {
    fn default() -> Self {
        let defaults = pubrecon_pubmed::Config::default();
        Self {
            base_url: defaults.base_url,
            email: std::env::var("NCBI_EMAIL").ok(),
            tool: defaults.tool,
            api_key: std::env::var("NCBI_API_KEY").ok(),
            max_results: defaults.max_results,
            batch_size: defaults.batch_size,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        let policy = RetryPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            base_delay_secs: policy.base_delay.as_secs(),
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./pubrecon.toml (current directory)
    /// 2. ~/.config/pubrecon/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("pubrecon.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "pubrecon") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn matcher(&self) -> PublicationMatcher {
        PublicationMatcher {
            journal_title_threshold: self.matching.journal_title_threshold,
            fallback_title_threshold: self.matching.fallback_title_threshold,
            fallback: self.matching.fallback,
        }
    }

    pub fn apply_options(&self, dry_run: bool) -> ApplyOptions {
        ApplyOptions {
            name_threshold: self.matching.name_threshold,
            delete_threshold: self.matching.delete_threshold,
            dry_run,
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            base_delay: Duration::from_secs(self.retry.base_delay_secs),
        }
    }

    pub fn pubmed_config(&self) -> pubrecon_pubmed::Config {
        pubrecon_pubmed::Config {
            base_url: self.pubmed.base_url.clone(),
            email: self.pubmed.email.clone(),
            tool: self.pubmed.tool.clone(),
            api_key: self.pubmed.api_key.clone(),
            max_results: self.pubmed.max_results,
            batch_size: self.pubmed.batch_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.database.path, PathBuf::from("./data/pubrecon.duckdb"));
        assert_eq!(config.matching.name_threshold, 0.80);
        assert_eq!(config.matching.delete_threshold, 0.75);
        assert_eq!(config.matching.fallback, FallbackMode::First);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_secs, 5);
        assert_eq!(config.pubmed.batch_size, 200);
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("PUBRECON_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${PUBRECON_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("PUBRECON_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[database]
path = "/tmp/study.duckdb"

[matching]
journal_title_threshold = 0.9
fallback = "best"

[pubmed]
email = "lab@example.org"
api_key = "${NONEXISTENT_VAR_12345}"
batch_size = 50

[retry]
max_attempts = 5
base_delay_secs = 1
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.database.path, PathBuf::from("/tmp/study.duckdb"));
        assert_eq!(config.matching.journal_title_threshold, 0.9);
        // unset keys keep their defaults
        assert_eq!(config.matching.fallback_title_threshold, 0.85);
        assert_eq!(config.matching.fallback, FallbackMode::Best);
        assert_eq!(config.pubmed.email.as_deref(), Some("lab@example.org"));
        assert_eq!(config.pubmed.api_key, None);
        assert_eq!(config.pubmed.batch_size, 50);
        assert_eq!(config.pubmed.tool, "pubrecon");

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_secs(1));
    }

    #[test]
    fn conversions_carry_thresholds() {
        let mut config = Config::default();
        config.matching.delete_threshold = 0.6;
        config.matching.fallback = FallbackMode::Best;

        let options = config.apply_options(true);
        assert!(options.dry_run);
        assert_eq!(options.delete_threshold, 0.6);
        assert_eq!(config.matcher().fallback, FallbackMode::Best);
        assert_eq!(config.pubmed_config().base_url, config.pubmed.base_url);
    }

    #[test]
    fn from_file_reports_bad_toml() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pubrecon.toml");
        std::fs::write(&path, "[matching\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }
}
