//! Configuration loading from files and environment variables
//!
//! TOML file first, then environment overrides, then validation. The
//! environment keys match the ones the scheduled updater has always used,
//! so existing container deployments keep working.

use std::path::Path;

use super::ConfigError;
use super::types::AppConfig;
use crate::types::MaxCandidates;

/// Where the effective configuration came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    File,
    Environment,
    Default,
}

impl ConfigSource {
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::File => "configuration file",
            Self::Environment => "environment variables",
            Self::Default => "built-in defaults",
        }
    }
}

/// Environment variables understood by [`AppConfig::apply_env_overrides`]
pub const ENV_KEYS: [&str; 7] = [
    "BASE_URL",
    "ADMIN_ID",
    "ADMIN_TOKEN",
    "CHANNEL_IDS",
    "PROXY_REGION",
    "MAX_PROXY_TEST_COUNT",
    "PROXY_LIST_URL",
];

impl AppConfig {
    /// Apply overrides from `lookup`, returning the keys that were applied
    ///
    /// Blank values count as unset. `CHANNEL_IDS` must be a JSON array of
    /// integers, e.g. `[1, 2, 5]`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<Vec<&'static str>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut applied = Vec::new();

        for key in ENV_KEYS {
            let Some(value) = get(key) else {
                continue;
            };
            match key {
                "BASE_URL" => self.channel.base_url = Some(value),
                "ADMIN_ID" => self.channel.admin_id = Some(value),
                "ADMIN_TOKEN" => self.channel.admin_token = Some(value),
                "CHANNEL_IDS" => self.channel.channel_ids = parse_channel_ids(&value)?,
                "PROXY_REGION" => self.source.region = value,
                "MAX_PROXY_TEST_COUNT" => {
                    self.source.max_candidates = value
                        .parse::<MaxCandidates>()
                        .map_err(|reason| ConfigError::Env { key, reason })?;
                }
                "PROXY_LIST_URL" => self.source.url = value,
                _ => continue,
            }
            applied.push(key);
        }

        Ok(applied)
    }
}

fn parse_channel_ids(value: &str) -> Result<Vec<i64>, ConfigError> {
    serde_json::from_str::<Vec<i64>>(value).map_err(|e| ConfigError::Env {
        key: "CHANNEL_IDS",
        reason: format!("expected a JSON array of integers: {e}"),
    })
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Parse a TOML document without touching the environment
pub fn parse_config(content: &str, origin: &str) -> Result<AppConfig, ConfigError> {
    toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.to_string(),
        source,
    })
}

/// Load configuration from a TOML file, with environment variable overrides
pub fn load_config(config_path: impl AsRef<Path>) -> Result<AppConfig, ConfigError> {
    let path = config_path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let mut config = parse_config(&content, &path.display().to_string())?;
    let applied = config.apply_env_overrides(process_env)?;
    if !applied.is_empty() {
        tracing::info!(
            "Applied environment overrides over config file: {}",
            applied.join(", ")
        );
    }

    config.validate()?;
    Ok(config)
}

/// Load from `config_path` when it exists, otherwise from defaults plus environment
pub fn load_config_with_fallback(
    config_path: impl AsRef<Path>,
) -> Result<(AppConfig, ConfigSource), ConfigError> {
    let path = config_path.as_ref();
    if path.exists() {
        return Ok((load_config(path)?, ConfigSource::File));
    }

    tracing::debug!(
        "Config file '{}' not found, using defaults",
        path.display()
    );
    let mut config = AppConfig::default();
    let applied = config.apply_env_overrides(process_env)?;
    config.validate()?;

    let source = if applied.is_empty() {
        ConfigSource::Default
    } else {
        ConfigSource::Environment
    };
    Ok((config, source))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_env_overrides_applied() {
        let mut config = AppConfig::default();
        let applied = config
            .apply_env_overrides(lookup(&[
                ("BASE_URL", "https://api.example.com"),
                ("ADMIN_ID", "1"),
                ("ADMIN_TOKEN", "token"),
                ("CHANNEL_IDS", "[4, 8]"),
                ("PROXY_REGION", "日本"),
                ("MAX_PROXY_TEST_COUNT", "9"),
            ]))
            .unwrap();

        assert_eq!(applied.len(), 6);
        assert_eq!(config.channel.channel_ids, vec![4, 8]);
        assert_eq!(config.source.region, "日本");
        assert_eq!(config.source.max_candidates.get(), 9);
        assert!(config.channel.is_complete());
    }

    #[test]
    fn test_blank_env_values_ignored() {
        let mut config = AppConfig::default();
        let applied = config
            .apply_env_overrides(lookup(&[("PROXY_REGION", "  "), ("ADMIN_ID", "")]))
            .unwrap();
        assert!(applied.is_empty());
        assert_eq!(config.source.region, "香港");
    }

    #[test]
    fn test_channel_ids_must_be_json_array() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(lookup(&[("CHANNEL_IDS", "1,2,3")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Env {
                key: "CHANNEL_IDS",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_max_test_count_rejected() {
        let mut config = AppConfig::default();
        let err = config
            .apply_env_overrides(lookup(&[("MAX_PROXY_TEST_COUNT", "0")]))
            .unwrap_err();
        assert!(err.to_string().contains("MAX_PROXY_TEST_COUNT"));
    }

    #[test]
    fn test_parse_config_error_names_origin() {
        let err = parse_config("[[[", "inline.toml").unwrap_err();
        assert!(err.to_string().contains("inline.toml"));
    }

    #[test]
    fn test_config_source_descriptions() {
        assert_eq!(ConfigSource::File.description(), "configuration file");
        assert_eq!(
            ConfigSource::Environment.description(),
            "environment variables"
        );
        assert_eq!(ConfigSource::Default.description(), "built-in defaults");
    }
}
