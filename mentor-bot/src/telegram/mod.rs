//! Telegram channel adapter.
//!
//! Long-polls the Bot API for messages and inline button presses and sends
//! plain-text replies with optional inline keyboards.

use crate::message::{EventKind, InboundEvent, InlineButton, OutgoingMessage, Sender};
use crate::traits::{Channel, ChannelError, ChannelResult};
use async_trait::async_trait;
use mentor_common::util::sanitize_for_log;
use serde_json::Value;
use std::time::Duration;
use tokio::sync::mpsc;

/// Telegram's per-message text limit.
const MAX_MESSAGE_LEN: usize = 4096;

/// Delay before polling again after a failed `getUpdates`.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

// ============================================================================
// Telegram Channel
// ============================================================================

/// Telegram channel - long-polls the Bot API for updates.
pub struct TelegramChannel {
    bot_token: String,
    allowed_users: Vec<String>,
    poll_timeout_secs: u64,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    /// Create a new Telegram channel.
    pub fn new(bot_token: String, allowed_users: Vec<String>, poll_timeout_secs: u64) -> Self {
        // The HTTP timeout has to outlast the long-poll timeout
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(poll_timeout_secs + 15))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            bot_token,
            allowed_users,
            poll_timeout_secs,
            api_base: DEFAULT_API_BASE.to_string(),
            client,
        }
    }

    /// Point the adapter at a different Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!("{}/bot{}/{method}", self.api_base, self.bot_token)
    }

    fn is_user_allowed(&self, identity: &str) -> bool {
        self.allowed_users.iter().any(|u| u == "*" || u == identity)
    }

    fn is_sender_allowed(&self, sender: &Sender) -> bool {
        self.is_user_allowed(&sender.id)
            || sender
                .username
                .as_deref()
                .is_some_and(|name| self.is_user_allowed(name))
    }

    async fn post(&self, method: &str, body: &Value) -> anyhow::Result<Value> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow::anyhow!(sanitize_for_log(&e.to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            let err = resp.text().await.unwrap_or_default();
            anyhow::bail!("Telegram {method} failed ({status}): {err}");
        }

        resp.json()
            .await
            .map_err(|e| anyhow::anyhow!(sanitize_for_log(&e.to_string())))
    }

    /// Send one chunk of text, optionally with an inline keyboard.
    async fn send_text(
        &self,
        chat_id: &str,
        text: &str,
        keyboard: Option<&[Vec<InlineButton>]>,
    ) -> anyhow::Result<i64> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(rows) = keyboard {
            body["reply_markup"] = serde_json::json!({ "inline_keyboard": rows });
        }

        let data = self.post("sendMessage", &body).await?;
        data.get("result")
            .and_then(|r| r.get("message_id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| anyhow::anyhow!("Missing message_id in response"))
    }

    /// Acknowledge a button press so the client stops its spinner.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> anyhow::Result<()> {
        let body = serde_json::json!({ "callback_query_id": callback_query_id });
        self.post("answerCallbackQuery", &body).await?;
        Ok(())
    }

    /// Fetch one batch of updates starting at `offset`.
    ///
    /// Returns the parsed events (with callback query ids for button
    /// presses) and the offset for the next poll.
    pub async fn fetch_updates(
        &self,
        offset: i64,
    ) -> ChannelResult<(Vec<(InboundEvent, Option<String>)>, i64)> {
        let body = serde_json::json!({
            "offset": offset,
            "timeout": self.poll_timeout_secs,
            "allowed_updates": ["message", "callback_query"]
        });

        let data = self
            .post("getUpdates", &body)
            .await
            .map_err(|e| ChannelError::Connection(e.to_string()))?;

        let mut next_offset = offset;
        let mut events = Vec::new();

        let Some(results) = data.get("result").and_then(Value::as_array) else {
            return Ok((events, next_offset));
        };

        for update in results {
            if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                next_offset = next_offset.max(uid + 1);
            }

            let parsed = if let Some(cb) = update.get("callback_query") {
                parse_callback_query(cb).map(|(id, event)| (event, Some(id)))
            } else if let Some(message) = update.get("message") {
                parse_message(message).map(|event| (event, None))
            } else {
                None
            };

            let Some((event, callback_id)) = parsed else {
                continue;
            };

            if !self.is_sender_allowed(&event.sender) {
                tracing::warn!(
                    user_id = %event.sender.id,
                    username = event.sender.username.as_deref().unwrap_or("unknown"),
                    "Telegram: ignoring update from unauthorized user"
                );
                continue;
            }

            events.push((event, callback_id));
        }

        Ok((events, next_offset))
    }
}

fn parse_sender(from: &Value) -> Option<Sender> {
    let id = from.get("id")?.as_i64()?.to_string();
    Some(Sender {
        id,
        display_name: from
            .get("first_name")
            .and_then(Value::as_str)
            .map(String::from),
        username: from
            .get("username")
            .and_then(Value::as_str)
            .map(String::from),
    })
}

/// Parse a `message` update. Non-text messages are skipped.
fn parse_message(message: &Value) -> Option<InboundEvent> {
    let chat_id = message.get("chat")?.get("id")?.as_i64()?.to_string();
    let sender = parse_sender(message.get("from")?)?;
    let text = message.get("text")?.as_str()?;

    tracing::info!(
        channel = "telegram",
        user_id = %sender.id,
        chat_id = %chat_id,
        "Message received"
    );

    Some(InboundEvent::new(chat_id, sender, EventKind::from_text(text)))
}

/// Parse a `callback_query` update into its query id and a button event.
fn parse_callback_query(callback: &Value) -> Option<(String, InboundEvent)> {
    let id = callback.get("id")?.as_str()?.to_string();
    let data = callback.get("data")?.as_str()?.to_string();
    let sender = parse_sender(callback.get("from")?)?;
    let chat_id = callback
        .get("message")?
        .get("chat")?
        .get("id")?
        .as_i64()?
        .to_string();

    tracing::info!(
        channel = "telegram",
        user_id = %sender.id,
        chat_id = %chat_id,
        data = %data,
        "Button pressed"
    );

    Some((id, InboundEvent::new(chat_id, sender, EventKind::Button { data })))
}

/// Split a message into chunks that fit within Telegram's limit.
///
/// Prefers paragraph, line, sentence, then word boundaries and never cuts
/// inside a UTF-8 character.
fn split_message(message: &str, max_len: usize) -> Vec<String> {
    if message.len() <= max_len {
        return vec![message.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = message;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let mut boundary = max_len;
        while !remaining.is_char_boundary(boundary) {
            boundary -= 1;
        }

        let chunk = &remaining[..boundary];
        let split_pos = chunk
            .rfind("\n\n")
            .or_else(|| chunk.rfind('\n'))
            .or_else(|| chunk.rfind(". ").map(|p| p + 1))
            .or_else(|| chunk.rfind(' '))
            .unwrap_or(boundary);

        let actual_split = if split_pos == 0 { boundary } else { split_pos };

        chunks.push(remaining[..actual_split].to_string());
        remaining = remaining[actual_split..].trim_start();
    }

    chunks
}

#[async_trait]
impl Channel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn init(&mut self) -> ChannelResult<()> {
        // Verify bot token by calling getMe
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::Connection(sanitize_for_log(&e.to_string())))?;

        if !resp.status().is_success() {
            let err = resp.text().await.unwrap_or_default();
            return Err(ChannelError::Auth(format!("Invalid bot token: {err}")));
        }

        let me: Value = resp
            .json()
            .await
            .map_err(|e| ChannelError::Connection(sanitize_for_log(&e.to_string())))?;
        let username = me
            .get("result")
            .and_then(|r| r.get("username"))
            .and_then(Value::as_str)
            .unwrap_or("unknown");

        tracing::info!(bot = %username, "Telegram channel initialized");
        Ok(())
    }

    async fn send(&self, message: OutgoingMessage) -> ChannelResult<String> {
        let chunks = split_message(&message.reply.text, MAX_MESSAGE_LEN);
        let last = chunks.len().saturating_sub(1);
        let mut message_id = 0;

        for (i, chunk) in chunks.iter().enumerate() {
            // Buttons go under the final chunk
            let keyboard = if i == last {
                message.reply.keyboard.as_deref()
            } else {
                None
            };
            message_id = self
                .send_text(&message.chat_id, chunk, keyboard)
                .await
                .map_err(|e| ChannelError::SendFailed(e.to_string()))?;
        }

        Ok(message_id.to_string())
    }

    async fn listen(&self, tx: mpsc::Sender<InboundEvent>) -> ChannelResult<()> {
        let mut offset: i64 = 0;

        tracing::info!("Telegram channel listening for updates...");

        loop {
            let (events, next_offset) = match self.fetch_updates(offset).await {
                Ok(batch) => batch,
                Err(e) => {
                    tracing::warn!(error = %e, "Telegram poll error");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };
            offset = next_offset;

            for (event, callback_id) in events {
                if let Some(id) = callback_id {
                    if let Err(e) = self.answer_callback_query(&id).await {
                        tracing::warn!(error = %e, "Failed to answer callback query");
                    }
                }

                if tx.send(event).await.is_err() {
                    return Err(ChannelError::Internal("event receiver closed".into()));
                }
            }
        }
    }

    async fn health_check(&self) -> ChannelResult<()> {
        let resp = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(|e| ChannelError::Connection(sanitize_for_log(&e.to_string())))?;

        if resp.status().is_success() {
            Ok(())
        } else {
            Err(ChannelError::NotReady)
        }
    }

    async fn shutdown(&self) -> ChannelResult<()> {
        tracing::info!("Telegram channel shutting down");
        Ok(())
    }
}
