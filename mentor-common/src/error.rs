//! Error types shared by the Mentor crates.

use thiserror::Error;

use crate::validation::ValidationError;

/// Result type alias using the Mentor error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Startup errors. Any of these stops the bot before it connects.
#[derive(Error, Debug)]
pub enum Error {
    /// Required setting missing or unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration failed validation
    #[error("Invalid configuration: {0}")]
    Validation(#[from] ValidationError),

    /// Other error with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create an error with additional context.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// Extension trait for adding context to any error type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_context_display() {
        let err = Error::Config("BOT_TOKEN is not set".into()).with_context("startup");
        assert_eq!(
            err.to_string(),
            "startup: Configuration error: BOT_TOKEN is not set"
        );
    }

    #[test]
    fn test_result_ext_wraps_validation_error() {
        let res: std::result::Result<(), ValidationError> = Err(ValidationError::MissingField {
            field: "telegram.bot_token".into(),
        });
        let err = res.context("startup").unwrap_err();
        match err {
            Error::WithContext { context, source } => {
                assert_eq!(context, "startup");
                assert!(matches!(*source, Error::Validation(_)));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }
}
