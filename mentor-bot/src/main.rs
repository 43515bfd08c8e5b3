//! Mentor Bot - Main entry point.

use anyhow::Result;
use mentor_bot::{
    spawn_processor, Assistant, Channel, Dispatcher, JsonFileStore, Quiz, TelegramChannel,
};
use mentor_common::config::Config;
use mentor_common::logging::init_logging;
use mentor_common::{Error, ResultExt};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Capacity of the queue between the poller and the processor.
const EVENT_QUEUE_SIZE: usize = 100;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load_with_env()?;

    // Initialize logging
    init_logging(
        &config.observability.log_level,
        &config.observability.log_format,
    );

    tracing::info!("Mentor Bot v{}", env!("CARGO_PKG_VERSION"));

    config.validate().context("startup")?;

    let store = Arc::new(JsonFileStore::new(&config.storage.data_file));
    let assistant = Arc::new(Assistant::from_config(&config.llm));
    if !assistant.is_configured() {
        tracing::warn!("OPENAI_API_KEY not set; assistant replies will be a warning");
    }
    let quiz = Quiz::from_config(&config.quiz)
        .ok_or_else(|| Error::Config("quiz has no questions".into()))
        .context("startup")?;
    let dispatcher = Arc::new(Dispatcher::new(store, assistant, quiz));

    tracing::info!(
        data_file = %config.storage.data_file.display(),
        model = %config.llm.model,
        questions = config.quiz.questions.len(),
        "Dispatcher ready"
    );

    let token = config
        .bot_token()
        .ok_or_else(|| Error::Config("BOT_TOKEN is not set".into()))
        .context("startup")?
        .to_string();
    let mut telegram = TelegramChannel::new(
        token,
        config.telegram.allowed_users.clone(),
        config.telegram.poll_timeout_secs,
    );
    telegram.init().await?;
    let telegram = Arc::new(telegram);

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_SIZE);
    let processor = spawn_processor(dispatcher, telegram.clone(), rx);

    tracing::info!("✅ Bot started; assistant mode is available from the menu");

    tokio::select! {
        result = telegram.listen(tx) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "Telegram listener stopped");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    telegram.shutdown().await?;
    processor.abort();

    Ok(())
}
