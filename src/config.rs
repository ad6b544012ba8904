use crate::error::{Error, Result};
use std::env;

pub const DEFAULT_HN_API_BASE_URL: &str = "https://hacker-news.firebaseio.com/v0";
pub const DEFAULT_ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_CLASSIFIER_MODEL: &str = "claude-3-5-haiku-20241022";

#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub database_url: Option<String>,
    pub hn_api_base_url: String,
    pub anthropic_base_url: String,
    pub classifier_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let anthropic_api_key = var("ANTHROPIC_API_KEY").ok_or_else(|| {
            Error::Config("ANTHROPIC_API_KEY environment variable not set".to_string())
        })?;

        let database_url = var("DATABASE_URL");

        let hn_api_base_url =
            var("HN_API_BASE_URL").unwrap_or_else(|| DEFAULT_HN_API_BASE_URL.to_string());

        let anthropic_base_url =
            var("ANTHROPIC_BASE_URL").unwrap_or_else(|| DEFAULT_ANTHROPIC_BASE_URL.to_string());

        let classifier_model =
            var("CLASSIFIER_MODEL").unwrap_or_else(|| DEFAULT_CLASSIFIER_MODEL.to_string());

        Ok(Self {
            anthropic_api_key,
            database_url,
            hn_api_base_url,
            anthropic_base_url,
            classifier_model,
        })
    }

    /// Connection string for the workflow engine's database.
    pub fn database_url(&self) -> Result<&str> {
        self.database_url
            .as_deref()
            .ok_or_else(|| Error::Config("DATABASE_URL environment variable not set".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct CompareConfig {
    pub limit: u32,
    pub models: Vec<String>,
    pub show_progress: bool,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            models: crate::compare::DEFAULT_MODELS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            show_progress: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/db")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_blank_api_key_is_config_error() {
        let result = Config::from_lookup(lookup(&[("ANTHROPIC_API_KEY", "   ")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_defaults_fill_unset_values() {
        let config = Config::from_lookup(lookup(&[
            ("ANTHROPIC_API_KEY", "key"),
            ("CLASSIFIER_MODEL", "claude-test"),
        ]))
        .unwrap();
        assert_eq!(config.anthropic_api_key, "key");
        assert_eq!(config.classifier_model, "claude-test");
        assert_eq!(config.hn_api_base_url, DEFAULT_HN_API_BASE_URL);
        assert_eq!(config.anthropic_base_url, DEFAULT_ANTHROPIC_BASE_URL);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_database_url_required_when_missing() {
        let config = Config {
            anthropic_api_key: "key".to_string(),
            database_url: None,
            hn_api_base_url: DEFAULT_HN_API_BASE_URL.to_string(),
            anthropic_base_url: DEFAULT_ANTHROPIC_BASE_URL.to_string(),
            classifier_model: DEFAULT_CLASSIFIER_MODEL.to_string(),
        };
        assert!(matches!(config.database_url(), Err(Error::Config(_))));
    }

    #[test]
    fn test_compare_defaults() {
        let config = CompareConfig::default();
        assert_eq!(config.limit, 10);
        assert_eq!(config.models.len(), 3);
    }
}
