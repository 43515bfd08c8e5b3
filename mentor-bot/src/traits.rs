//! Channel and handler traits.

use crate::message::{InboundEvent, OutgoingMessage, Reply};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Channel error type.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Message send failed: {0}")]
    SendFailed(String),

    #[error("Channel not ready")]
    NotReady,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Messaging platform adapter.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Get the channel name.
    fn name(&self) -> &'static str;

    /// Initialize the channel (verify credentials).
    async fn init(&mut self) -> ChannelResult<()>;

    /// Send a message, returning the platform message id.
    async fn send(&self, message: OutgoingMessage) -> ChannelResult<String>;

    /// Receive events until the receiver side of `tx` is dropped.
    async fn listen(&self, tx: mpsc::Sender<InboundEvent>) -> ChannelResult<()>;

    /// Check if the channel is healthy.
    async fn health_check(&self) -> ChannelResult<()>;

    /// Shutdown the channel gracefully.
    async fn shutdown(&self) -> ChannelResult<()>;
}

/// Turns one inbound event into zero or more replies.
///
/// Handlers never fail: collaborator errors are already folded into reply
/// text, and unknown events produce no replies.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: InboundEvent) -> Vec<Reply>;
}
