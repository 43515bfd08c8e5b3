//! Message types flowing between the channel adapter and the dispatcher.

use serde::{Deserialize, Serialize};

/// Prefix that marks a text message as a command.
pub const COMMAND_PREFIX: char = '/';

/// The user an event came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sender {
    /// Stringified numeric user id
    pub id: String,
    /// First name as shown by the platform
    pub display_name: Option<String>,
    /// Platform username without the leading `@`
    pub username: Option<String>,
}

impl Sender {
    /// Create a sender with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            username: None,
        }
    }

    /// Set the display name.
    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Name to greet the user with, falling back to a generic one.
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or("friend")
    }
}

/// What kind of interaction the event carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EventKind {
    /// `/name` typed by the user; trailing arguments are dropped
    Command { name: String },
    /// Inline keyboard button press
    Button { data: String },
    /// Any other text
    Text { text: String },
}

impl EventKind {
    /// Classify raw message text as either a command or free text.
    ///
    /// `/start@my_bot extra` becomes `Command { name: "start" }`.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        let Some(rest) = trimmed.strip_prefix(COMMAND_PREFIX) else {
            return Self::Text {
                text: trimmed.to_string(),
            };
        };

        let head = rest.split(char::is_whitespace).next().unwrap_or(rest);
        let name = head.split('@').next().unwrap_or(head);

        Self::Command {
            name: name.to_lowercase(),
        }
    }
}

/// Unified inbound event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Chat the reply goes to
    pub chat_id: String,
    /// Who sent it
    pub sender: Sender,
    pub kind: EventKind,
    /// Timestamp (Unix millis)
    pub timestamp: i64,
    /// Trace id for log correlation
    pub trace_id: String,
}

impl InboundEvent {
    /// Create an event stamped with the current time and a fresh trace id.
    pub fn new(chat_id: impl Into<String>, sender: Sender, kind: EventKind) -> Self {
        Self {
            chat_id: chat_id.into(),
            sender,
            kind,
            timestamp: chrono::Utc::now().timestamp_millis(),
            trace_id: mentor_common::logging::generate_trace_id(),
        }
    }

    /// Short label for logging.
    pub fn kind_str(&self) -> &'static str {
        match self.kind {
            EventKind::Command { .. } => "command",
            EventKind::Button { .. } => "button",
            EventKind::Text { .. } => "text",
        }
    }
}

/// A single inline keyboard button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

/// Rows of inline buttons attached to a reply.
pub type Keyboard = Vec<Vec<InlineButton>>;

/// Text reply with an optional keyboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    /// Plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    /// Reply carrying a keyboard.
    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Outgoing message to send to a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub chat_id: String,
    pub reply: Reply,
}
