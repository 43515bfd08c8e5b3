//! Shared test doubles.

#![allow(dead_code)]

use async_trait::async_trait;
use mentor_bot::llm::{ChatRequest, ChatResponse, Provider, ProviderError, TokenUsage};
use mentor_bot::store::StoreResult;
use mentor_bot::{
    Channel, ChannelResult, Dispatcher, InboundEvent, LanguageModel, MemoryStore, OutgoingMessage,
    Quiz, SessionStore, Store, StoreError,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Language model that answers from a script and records every prompt.
#[derive(Default)]
pub struct ScriptedModel {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn ask(&self, prompt: &str) -> String {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "no".to_string())
    }
}

/// Provider that always answers with the same raw completion text.
pub struct FixedProvider {
    content: String,
}

impl FixedProvider {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[async_trait]
impl Provider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ProviderError> {
        Ok(ChatResponse {
            model: request.model,
            content: self.content.clone(),
            usage: TokenUsage::default(),
            finish_reason: Some("stop".into()),
            latency_ms: 1,
        })
    }
}

/// Store that loads empty and rejects every save.
#[derive(Default)]
pub struct FailingStore {
    save_attempts: Mutex<usize>,
}

impl FailingStore {
    pub fn save_attempts(&self) -> usize {
        *self.save_attempts.lock().unwrap()
    }
}

#[async_trait]
impl SessionStore for FailingStore {
    async fn load(&self) -> Store {
        Store::new()
    }

    async fn save(&self, _store: &Store) -> StoreResult<()> {
        *self.save_attempts.lock().unwrap() += 1;
        Err(StoreError::Io {
            path: "/read-only/data.json".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
        })
    }
}

/// Channel that records sent messages instead of talking to a platform.
#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<OutgoingMessage>>,
}

impl RecordingChannel {
    pub fn sent(&self) -> Vec<OutgoingMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn init(&mut self) -> ChannelResult<()> {
        Ok(())
    }

    async fn send(&self, message: OutgoingMessage) -> ChannelResult<String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(sent.len().to_string())
    }

    async fn listen(&self, _tx: mpsc::Sender<InboundEvent>) -> ChannelResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> ChannelResult<()> {
        Ok(())
    }

    async fn shutdown(&self) -> ChannelResult<()> {
        Ok(())
    }
}

/// Dispatcher over an in-memory store with the default questions.
pub fn dispatcher(model: Arc<ScriptedModel>) -> (Dispatcher, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let dispatcher = Dispatcher::new(store.clone(), model, Quiz::default());
    (dispatcher, store)
}
