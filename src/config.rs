// src/config.rs
//! Environment-driven configuration, built once at process entry and passed
//! by reference into each component.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::utils::preview_secret;

pub const DEFAULT_SMTP_SERVER: &str = "smtp.gmail.com";
pub const DEFAULT_SMTP_PORT: u16 = 465;

pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_QA_ROLE: &str = "Senior Quality Analyst with 10 years experience (manual + automation, ecommerce)";

pub const DEFAULT_HISTORY_FILE: &str = "last_questions.json";
pub const DEFAULT_MAX_HISTORY: usize = 100;

pub const DEFAULT_RAPIDAPI_HOST: &str = "jsearch.p.rapidapi.com";
pub const DEFAULT_RAPIDAPI_URL: &str = "https://jsearch.p.rapidapi.com/search";
pub const DEFAULT_SEARCH_TIMEOUT_SECS: u64 = 10;

pub const DEFAULT_ROLES: [&str; 6] = [
    "Senior Quality Analyst",
    "Senior QA Tester",
    "Senior Quality Engineer",
    "Senior QA Lead",
    "Magento QA Lead",
    "Commerce QA",
];
pub const DEFAULT_LOCATIONS: [&str; 2] = ["Ahmedabad", "Remote"];

/// Source of configuration values. The process environment in production,
/// a map in tests.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.trim().is_empty())
    }
}

impl EnvSource for std::collections::HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        std::collections::HashMap::get(self, key)
            .cloned()
            .filter(|v| !v.trim().is_empty())
    }
}

fn required(env: &dyn EnvSource, key: &str) -> Result<String> {
    env.get(key)
        .with_context(|| format!("{} environment variable not set", key))
}

fn parsed_or<T>(env: &dyn EnvSource, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {}", key, raw)),
        None => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct MailConfig {
    pub sender: String,
    pub password: String,
    pub receiver: String,
    pub smtp_server: String,
    pub smtp_port: u16,
}

impl MailConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self> {
        let config = Self {
            sender: required(env, "EMAIL_SENDER")?,
            password: required(env, "EMAIL_PASSWORD")?,
            receiver: required(env, "EMAIL_RECEIVER")?,
            smtp_server: env
                .get("SMTP_SERVER")
                .unwrap_or_else(|| DEFAULT_SMTP_SERVER.to_string()),
            smtp_port: parsed_or(env, "SMTP_PORT", DEFAULT_SMTP_PORT)?,
        };

        info!("Mail config loaded:");
        info!("  EMAIL_SENDER: {}", config.sender);
        info!("  EMAIL_RECEIVER: {}", config.receiver);
        info!("  EMAIL_PASSWORD: {}", preview_secret(&config.password));
        info!("  SMTP relay: {}:{}", config.smtp_server, config.smtp_port);
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub role: String,
    pub temperature: f32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl GenerationConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self> {
        let config = Self {
            api_key: required(env, "GEMINI_API_KEY")?,
            api_url: env
                .get("GEMINI_API_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
            model: env
                .get("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            role: env
                .get("QA_ROLE")
                .unwrap_or_else(|| DEFAULT_QA_ROLE.to_string()),
            temperature: 0.9,
            top_p: 0.95,
            max_output_tokens: 4096,
        };

        info!("Generation config loaded:");
        info!("  GEMINI_API_KEY: {}", preview_secret(&config.api_key));
        info!("  GEMINI_MODEL: {}", config.model);
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct HistoryConfig {
    pub path: PathBuf,
    pub max_history: usize,
}

impl HistoryConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self> {
        let max_history = parsed_or(env, "MAX_HISTORY", DEFAULT_MAX_HISTORY)?;
        if max_history == 0 {
            anyhow::bail!("MAX_HISTORY must be at least 1");
        }

        Ok(Self {
            path: env
                .get("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE)),
            max_history,
        })
    }

    pub fn with_path(mut self, path: PathBuf) -> Self {
        self.path = path;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub api_host: String,
    pub api_url: String,
    pub timeout: Duration,
    pub roles: Vec<String>,
    pub locations: Vec<String>,
}

impl SearchConfig {
    pub fn from_env(env: &dyn EnvSource) -> Result<Self> {
        let config = Self {
            api_key: required(env, "RAPIDAPI_KEY")?,
            api_host: env
                .get("RAPIDAPI_HOST")
                .unwrap_or_else(|| DEFAULT_RAPIDAPI_HOST.to_string()),
            api_url: env
                .get("RAPIDAPI_URL")
                .unwrap_or_else(|| DEFAULT_RAPIDAPI_URL.to_string()),
            timeout: Duration::from_secs(DEFAULT_SEARCH_TIMEOUT_SECS),
            roles: DEFAULT_ROLES.iter().map(|s| s.to_string()).collect(),
            locations: DEFAULT_LOCATIONS.iter().map(|s| s.to_string()).collect(),
        };

        info!("Search config loaded:");
        info!("  RAPIDAPI_KEY: {}", preview_secret(&config.api_key));
        info!("  RAPIDAPI_URL: {}", config.api_url);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_mail_config_defaults() {
        let vars = env(&[
            ("EMAIL_SENDER", "me@example.com"),
            ("EMAIL_PASSWORD", "app-password"),
            ("EMAIL_RECEIVER", "you@example.com"),
        ]);
        let config = MailConfig::from_env(&vars).unwrap();
        assert_eq!(config.smtp_server, DEFAULT_SMTP_SERVER);
        assert_eq!(config.smtp_port, 465);
    }

    #[test]
    fn test_missing_required_variable_is_named() {
        let vars = env(&[("EMAIL_SENDER", "me@example.com")]);
        let err = MailConfig::from_env(&vars).unwrap_err();
        assert!(err.to_string().contains("EMAIL_PASSWORD"));
    }

    #[test]
    fn test_blank_value_counts_as_missing() {
        let vars = env(&[("GEMINI_API_KEY", "   ")]);
        assert!(GenerationConfig::from_env(&vars).is_err());
    }

    #[test]
    fn test_history_config_parses_overrides() {
        let vars = env(&[("HISTORY_FILE", "/tmp/h.json"), ("MAX_HISTORY", "25")]);
        let config = HistoryConfig::from_env(&vars).unwrap();
        assert_eq!(config.path, PathBuf::from("/tmp/h.json"));
        assert_eq!(config.max_history, 25);
    }

    #[test]
    fn test_history_config_rejects_bad_numbers() {
        assert!(HistoryConfig::from_env(&env(&[("MAX_HISTORY", "lots")])).is_err());
        assert!(HistoryConfig::from_env(&env(&[("MAX_HISTORY", "0")])).is_err());
    }

    #[test]
    fn test_search_config_cross_product_defaults() {
        let config = SearchConfig::from_env(&env(&[("RAPIDAPI_KEY", "k")])).unwrap();
        assert_eq!(config.roles.len() * config.locations.len(), 12);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }
}
