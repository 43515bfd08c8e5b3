//! Mentor Bot - a Telegram bot with dice, a quiz, and an assistant mode.
//!
//! ## Architecture
//!
//! The Telegram adapter long-polls for updates and pushes them into a bounded
//! channel. A single processor task drains it, runs each event through the
//! [`Dispatcher`], and sends the replies back through the adapter.
//!
//! ```text
//! Telegram → getUpdates → TelegramChannel → mpsc → processor → Dispatcher
//!                                                      ↓          ↓    ↓
//! Telegram ←── sendMessage ←───────────────────── replies   store  LLM
//! ```

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod action;
pub mod dispatcher;
pub mod llm;
pub mod message;
pub mod processor;
pub mod quiz;
pub mod replies;
pub mod session;
pub mod store;
pub mod telegram;
pub mod traits;

// Re-export commonly used types
pub use action::{Action, Command};
pub use dispatcher::Dispatcher;
pub use llm::{Assistant, LanguageModel, OpenAIProvider};
pub use message::{EventKind, InboundEvent, InlineButton, Keyboard, OutgoingMessage, Reply, Sender};
pub use processor::spawn_processor;
pub use quiz::{Quiz, QuizStep};
pub use session::{QuizState, Store, UserRecord};
pub use store::{JsonFileStore, MemoryStore, SessionStore, StoreError};
pub use telegram::TelegramChannel;
pub use traits::{Channel, ChannelError, ChannelResult, EventHandler};
