//! Event routing.
//!
//! Every event runs the same cycle: load the store, ensure the sender has a
//! record, mutate it, save the store, return the replies. Save failures are
//! logged and the replies are still returned.
//!
//! Free text is routed by precedence: command-prefixed text is ignored, an
//! active quiz takes the text as an answer, chat mode relays it to the
//! language model, and anything else is echoed back.

use crate::action::{Action, Command};
use crate::llm::LanguageModel;
use crate::message::{EventKind, InboundEvent, Reply, Sender, COMMAND_PREFIX};
use crate::quiz::{Quiz, QuizStep};
use crate::replies;
use crate::session::{QuizState, Store};
use crate::store::SessionStore;
use crate::traits::EventHandler;
use async_trait::async_trait;
use mentor_common::util::truncate_with_ellipsis;
use rand::Rng;
use std::sync::Arc;

/// Routes inbound events to commands, actions, quiz grading or the assistant.
pub struct Dispatcher {
    store: Arc<dyn SessionStore>,
    model: Arc<dyn LanguageModel>,
    quiz: Quiz,
}

impl Dispatcher {
    pub fn new(store: Arc<dyn SessionStore>, model: Arc<dyn LanguageModel>, quiz: Quiz) -> Self {
        Self { store, model, quiz }
    }

    async fn load(&self) -> Store {
        let mut store = self.store.load().await;
        store.normalize(self.quiz.len());
        store
    }

    async fn persist(&self, store: &Store) {
        if let Err(e) = self.store.save(store).await {
            tracing::error!(error = %e, "Failed to save session store");
        }
    }

    /// Handle a recognised slash command.
    pub async fn handle_command(&self, sender: &Sender, command: Command) -> Vec<Reply> {
        tracing::info!(user_id = %sender.id, command = %command, "Handling command");

        let action = match command {
            Command::Start => {
                let mut store = self.load().await;
                let chat_mode = store.ensure_user(&sender.id).chat_mode;
                self.persist(&store).await;
                return vec![replies::greeting(sender.greeting_name(), chat_mode)];
            }
            Command::Help => Action::Help,
            Command::Stats => Action::ShowStats,
            Command::Reset => Action::ResetStats,
            Command::Quiz => Action::StartQuiz,
            Command::Roll => Action::RollDice,
        };

        self.handle_action(sender, action).await
    }

    /// Handle a button press (or the command mapped to it).
    pub async fn handle_action(&self, sender: &Sender, action: Action) -> Vec<Reply> {
        tracing::info!(user_id = %sender.id, action = %action, "Handling action");

        let mut store = self.load().await;
        let reply = self.apply_action(&mut store, &sender.id, action);
        self.persist(&store).await;
        vec![reply]
    }

    fn apply_action(&self, store: &mut Store, user_id: &str, action: Action) -> Reply {
        let record = store.ensure_user(user_id);

        match action {
            Action::RollDice => {
                record.dice_count += 1;
                replies::dice(roll_die())
            }
            Action::Help => replies::help(),
            Action::EnableChat => {
                record.chat_mode = true;
                replies::chat_enabled()
            }
            Action::BackToMenu => {
                record.chat_mode = false;
                replies::back_to_menu()
            }
            Action::StartQuiz => {
                let (state, question) = self.quiz.start();
                record.quiz = Some(state);
                replies::quiz_started(question)
            }
            Action::ShowStats => replies::stats(record),
            Action::ResetStats => {
                store.reset_user(user_id);
                replies::reset_done()
            }
        }
    }

    /// Handle non-command free text.
    pub async fn handle_text(&self, sender: &Sender, text: &str) -> Vec<Reply> {
        let text = text.trim();
        tracing::debug!(
            user_id = %sender.id,
            preview = %truncate_with_ellipsis(text, 50),
            "Handling text"
        );
        let mut store = self.load().await;

        let record = store.ensure_user(&sender.id);
        record.message_count += 1;
        let quiz = record.quiz;
        let chat_mode = record.chat_mode;

        if text.starts_with(COMMAND_PREFIX) {
            self.persist(&store).await;
            return Vec::new();
        }

        if let Some(state) = quiz {
            let out = self.grade_answer(&mut store, &sender.id, state, text).await;
            self.persist(&store).await;
            return out;
        }

        self.persist(&store).await;

        if chat_mode {
            tracing::info!(user_id = %sender.id, "Relaying message to assistant");
            let answer = self.model.ask(text).await;
            return vec![replies::assistant_answer(answer)];
        }

        vec![replies::echo(text)]
    }

    async fn grade_answer(
        &self,
        store: &mut Store,
        user_id: &str,
        state: QuizState,
        answer: &str,
    ) -> Vec<Reply> {
        let Some(prompt) = self.quiz.grading_prompt(&state, answer) else {
            store.ensure_user(user_id).quiz = None;
            return Vec::new();
        };

        let verdict = self.model.ask(&prompt).await;
        let correct = self.quiz.is_affirmative(&verdict);
        tracing::info!(
            user_id = %user_id,
            question_index = state.question_index,
            correct,
            "Quiz answer graded"
        );

        let mut out = vec![replies::verdict(correct)];
        let record = store.ensure_user(user_id);

        match self.quiz.advance(state, correct) {
            QuizStep::Next { state, question } => {
                record.quiz = Some(state);
                out.push(replies::question(state.question_index, &question));
            }
            QuizStep::Finished { score, total } => {
                record.quiz = None;
                tracing::info!(user_id = %user_id, score, total, "Quiz finished");
                out.push(replies::quiz_finished(score, total));
            }
        }

        out
    }
}

fn roll_die() -> u8 {
    rand::thread_rng().gen_range(1..=6)
}

#[async_trait]
impl EventHandler for Dispatcher {
    async fn handle(&self, event: InboundEvent) -> Vec<Reply> {
        let sender = &event.sender;

        match &event.kind {
            EventKind::Command { name, .. } => match Command::parse(name) {
                Some(command) => self.handle_command(sender, command).await,
                None => {
                    tracing::debug!(user_id = %sender.id, command = %name, "Ignoring unknown command");
                    Vec::new()
                }
            },
            EventKind::Button { data } => match Action::from_callback_data(data) {
                Some(action) => self.handle_action(sender, action).await,
                None => {
                    tracing::debug!(user_id = %sender.id, data = %data, "Ignoring unknown button");
                    Vec::new()
                }
            },
            EventKind::Text { text } => self.handle_text(sender, text).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    struct Echoing;

    #[async_trait]
    impl LanguageModel for Echoing {
        async fn ask(&self, prompt: &str) -> String {
            format!("model: {prompt}")
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = Dispatcher::new(store.clone(), Arc::new(Echoing), Quiz::default());
        (dispatcher, store)
    }

    #[test]
    fn test_roll_die_range() {
        for _ in 0..200 {
            assert!((1..=6).contains(&roll_die()));
        }
    }

    #[tokio::test]
    async fn test_prefixed_text_is_counted_but_ignored() {
        let (dispatcher, store) = dispatcher();
        let sender = Sender::new("1");

        let out = dispatcher.handle_text(&sender, "/whatever").await;
        assert!(out.is_empty());
        assert_eq!(store.snapshot().await.get("1").unwrap().message_count, 1);
    }

    #[tokio::test]
    async fn test_quiz_takes_precedence_over_chat_mode() {
        let (dispatcher, store) = dispatcher();
        let sender = Sender::new("1");

        dispatcher.handle_action(&sender, Action::EnableChat).await;
        dispatcher.handle_action(&sender, Action::StartQuiz).await;
        let out = dispatcher.handle_text(&sender, "4").await;

        // Echoing model never answers "yes"
        assert_eq!(out[0].text, "❌ Incorrect.");
        assert_eq!(out[1].text, "Question 2: What is the capital of France?");

        let record = store.snapshot().await.get("1").cloned().unwrap();
        assert!(record.chat_mode);
        assert_eq!(record.quiz.unwrap().question_index, 1);
    }

    #[tokio::test]
    async fn test_unknown_events_leave_store_untouched() {
        let (dispatcher, store) = dispatcher();
        let sender = Sender::new("1");

        let button = InboundEvent::new("1", sender.clone(), EventKind::Button { data: "NOPE".into() });
        let command = InboundEvent::new("1", sender, EventKind::from_text("/launch"));

        assert!(dispatcher.handle(button).await.is_empty());
        assert!(dispatcher.handle(command).await.is_empty());
        assert!(store.snapshot().await.is_empty());
    }
}
