//! Configuration validation.
//!
//! Ensures every required value is present and within a valid range before
//! the bot starts polling.

use thiserror::Error;

use crate::config::{Config, LlmConfig, ObservabilityConfig, QuizConfig, TelegramConfig};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.telegram.validate() {
            errors.push(e);
        }
        if let Err(e) = self.llm.validate() {
            errors.push(e);
        }
        if let Err(e) = self.quiz.validate() {
            errors.push(e);
        }
        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }
}

impl Validate for TelegramConfig {
    fn validate(&self) -> ValidationResult<()> {
        let has_token = self
            .bot_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        if !has_token {
            return Err(ValidationError::MissingField {
                field: "telegram.bot_token (BOT_TOKEN)".into(),
            });
        }
        if self.poll_timeout_secs == 0 {
            return Err(ValidationError::InvalidValue {
                field: "telegram.poll_timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

impl Validate for LlmConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.max_tokens <= 0 {
            return Err(ValidationError::InvalidValue {
                field: "llm.max_tokens".into(),
                reason: format!("must be positive, got {}", self.max_tokens),
            });
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "llm.model".into(),
            });
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidValue {
                field: "llm.base_url".into(),
                reason: format!("'{}' is not an http(s) URL", self.base_url),
            });
        }
        Ok(())
    }
}

impl Validate for QuizConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.questions.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "quiz.questions".into(),
                reason: "at least one question is required".into(),
            });
        }
        if self.affirmative_token.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "quiz.affirmative_token".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        const FORMATS: &[&str] = &["json", "pretty"];

        if !LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("expected one of {LEVELS:?}, got '{}'", self.log_level),
            });
        }
        if !FORMATS.contains(&self.log_format.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: format!("expected one of {FORMATS:?}, got '{}'", self.log_format),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        let mut config = Config::default();
        config.telegram.bot_token = Some("123:ABC".into());
        config
    }

    #[test]
    fn test_valid_config() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_missing_bot_token() {
        let config = Config::default();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingField { .. }));
        assert!(err.to_string().contains("bot_token"));
    }

    #[test]
    fn test_empty_questions() {
        let mut config = valid_config();
        config.quiz.questions.clear();
        assert!(matches!(
            config.validate(),
            Err(ValidationError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_multiple_errors_collected() {
        let mut config = Config::default();
        config.llm.max_tokens = 0;
        config.observability.log_format = "xml".into();
        match config.validate() {
            Err(ValidationError::Multiple(errors)) => assert_eq!(errors.len(), 3),
            other => panic!("expected multiple errors, got {other:?}"),
        }
    }

    #[test]
    fn test_log_settings_are_case_insensitive() {
        let mut config = valid_config();
        config.observability.log_level = "DEBUG".into();
        config.observability.log_format = "JSON".into();
        assert!(config.validate().is_ok());

        config.observability.log_format = "Xml".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_api_key_is_optional() {
        let config = valid_config();
        assert!(config.llm.api_key.is_none());
        assert!(config.llm.validate().is_ok());
    }
}
