//! Configuration management for the Mentor bot.
//!
//! Configuration is read from `~/.mentor/config.json` (or the file named by
//! `MENTOR_CONFIG`) and then overlaid with environment variables.
//!
//! # Configuration Priority
//!
//! 1. Environment variables
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `MENTOR_CONFIG` → path of the config file itself
//! - `BOT_TOKEN` / `TELEGRAM_BOT_TOKEN` → telegram.bot_token
//! - `OPENAI_API_KEY` → llm.api_key
//! - `OPENAI_BASE_URL` → llm.base_url
//! - `MENTOR_MODEL` → llm.model
//! - `MENTOR_DATA_FILE` → storage.data_file
//! - `MENTOR_LOG_LEVEL` → observability.log_level
//! - `MENTOR_LOG_FORMAT` → observability.log_format

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".mentor"),
        |dirs| dirs.home_dir().join(".mentor"),
    )
}

/// Get the configuration file path, honouring `MENTOR_CONFIG`.
pub fn config_path() -> PathBuf {
    std::env::var("MENTOR_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| config_dir().join("config.json"))
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration for the bot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Telegram connection settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Language model settings
    #[serde(default)]
    pub llm: LlmConfig,

    /// Session storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Quiz content
    #[serde(default)]
    pub quiz: QuizConfig,

    /// Logging settings
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides using an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("BOT_TOKEN").or_else(|| get("TELEGRAM_BOT_TOKEN")) {
            self.telegram.bot_token = Some(token);
        }
        if let Some(key) = get("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(url) = get("OPENAI_BASE_URL") {
            self.llm.base_url = url;
        }
        if let Some(model) = get("MENTOR_MODEL") {
            self.llm.model = model;
        }
        if let Some(file) = get("MENTOR_DATA_FILE") {
            self.storage.data_file = PathBuf::from(file);
        }
        if let Some(level) = get("MENTOR_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = get("MENTOR_LOG_FORMAT") {
            self.observability.log_format = format;
        }
    }

    /// The bot token, if one is configured and non-empty.
    pub fn bot_token(&self) -> Option<&str> {
        self.telegram
            .bot_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

// ============================================================================
// Telegram Configuration
// ============================================================================

/// Telegram channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from BotFather. Required at startup.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Usernames or numeric ids allowed to talk to the bot (`*` = anyone)
    #[serde(default = "default_allowed_users")]
    pub allowed_users: Vec<String>,

    /// Long-poll timeout passed to `getUpdates`
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            allowed_users: default_allowed_users(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

fn default_allowed_users() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_poll_timeout() -> u64 {
    30
}

// ============================================================================
// LLM Configuration
// ============================================================================

/// Language model provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// API key. When absent, the assistant answers with a warning instead.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    /// Completion budget per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: i64,

    /// HTTP request timeout
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

impl LlmConfig {
    /// The API key, if one is configured and non-empty.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

fn default_llm_base_url() -> String {
    "https://api.openai.com".into()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".into()
}

fn default_max_tokens() -> i64 {
    350
}

fn default_llm_timeout() -> u64 {
    120
}

// ============================================================================
// Storage Configuration
// ============================================================================

/// Session storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding every user record
    #[serde(default = "default_data_file")]
    pub data_file: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: default_data_file(),
        }
    }
}

fn default_data_file() -> PathBuf {
    PathBuf::from("data.json")
}

// ============================================================================
// Quiz Configuration
// ============================================================================

/// Quiz content and grading configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Questions asked in order
    #[serde(default = "default_questions")]
    pub questions: Vec<String>,

    /// Verdict prefix counted as a correct answer (case-insensitive)
    #[serde(default = "default_affirmative_token")]
    pub affirmative_token: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            questions: default_questions(),
            affirmative_token: default_affirmative_token(),
        }
    }
}

fn default_questions() -> Vec<String> {
    vec![
        "What is 2 + 2?".into(),
        "What is the capital of France?".into(),
        "Which is heavier: 1 kg of cotton wool or 1 kg of iron?".into(),
    ]
}

fn default_affirmative_token() -> String {
    "yes".into()
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.bot_token().is_none());
        assert!(config.llm.api_key().is_none());
        assert_eq!(config.llm.model, "gpt-4o-mini");
        assert_eq!(config.llm.max_tokens, 350);
        assert_eq!(config.storage.data_file, PathBuf::from("data.json"));
        assert_eq!(config.quiz.questions.len(), 3);
        assert_eq!(config.telegram.allowed_users, vec!["*".to_string()]);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup(&[
            ("BOT_TOKEN", "123:ABC"),
            ("OPENAI_API_KEY", "sk-test"),
            ("MENTOR_DATA_FILE", "/tmp/users.json"),
            ("MENTOR_LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.bot_token(), Some("123:ABC"));
        assert_eq!(config.llm.api_key(), Some("sk-test"));
        assert_eq!(config.storage.data_file, PathBuf::from("/tmp/users.json"));
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn test_telegram_token_fallback_and_empty_values() {
        let mut config = Config::default();
        config.apply_overrides_from(lookup(&[
            ("BOT_TOKEN", "  "),
            ("TELEGRAM_BOT_TOKEN", "42:XYZ"),
            ("OPENAI_API_KEY", ""),
        ]));

        assert_eq!(config.bot_token(), Some("42:XYZ"));
        assert!(config.llm.api_key().is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "llm": {{ "model": "gpt-4o" }}, "quiz": {{ "questions": ["Why?"] }} }}"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.max_tokens, 350);
        assert_eq!(config.quiz.questions, vec!["Why?".to_string()]);
        assert_eq!(config.quiz.affirmative_token, "yes");
    }

    #[test]
    fn test_load_invalid_file_is_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
