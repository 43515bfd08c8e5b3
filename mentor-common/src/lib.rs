//! Mentor Common - shared configuration, errors, and logging for the Mentor bot.
//!
//! This crate provides:
//! - Configuration types and loading (file + environment)
//! - Configuration validation
//! - Error types and context helpers
//! - Logging setup
//! - Log sanitising and text utilities

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{
    Config, LlmConfig, ObservabilityConfig, QuizConfig, StorageConfig, TelegramConfig,
};
pub use error::{Error, Result, ResultExt};
pub use validation::{Validate, ValidationError, ValidationResult};

