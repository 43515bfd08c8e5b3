//! Background task that feeds inbound events through the handler.

use crate::message::{InboundEvent, OutgoingMessage};
use crate::traits::{Channel, EventHandler};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::Instrument;

/// Start the processor that drains `rx` and sends replies through `channel`.
///
/// Events are handled one at a time, in arrival order, so the store's
/// load-mutate-save cycle never interleaves within the process. The task
/// ends when every sender of `rx` has been dropped.
pub fn spawn_processor(
    handler: Arc<dyn EventHandler>,
    channel: Arc<dyn Channel>,
    mut rx: mpsc::Receiver<InboundEvent>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        tracing::info!(channel = channel.name(), "Event processor started");

        while let Some(event) = rx.recv().await {
            let span = tracing::info_span!(
                "event",
                trace_id = %event.trace_id,
                user_id = %event.sender.id,
                chat_id = %event.chat_id,
                kind = event.kind_str(),
            );

            process(handler.as_ref(), channel.as_ref(), event)
                .instrument(span)
                .await;
        }

        tracing::info!("Event processor stopped");
    })
}

async fn process(handler: &dyn EventHandler, channel: &dyn Channel, event: InboundEvent) {
    let chat_id = event.chat_id.clone();
    let received_at = event.timestamp;
    let replies = handler.handle(event).await;

    tracing::debug!(
        replies = replies.len(),
        elapsed_ms = chrono::Utc::now().timestamp_millis() - received_at,
        "Event handled"
    );

    for reply in replies {
        let message = OutgoingMessage {
            chat_id: chat_id.clone(),
            reply,
        };
        if let Err(e) = channel.send(message).await {
            tracing::error!(error = %e, "Failed to send reply");
        }
    }
}
