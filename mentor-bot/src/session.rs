//! Per-user session records.
//!
//! Field names on disk are camelCase. Records written by earlier versions of
//! the bot used `dice`, `messages`, `chat_mode` and `quiz.q`; those are read as
//! aliases and missing optional fields are back-filled with defaults during
//! deserialization.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Progress through an active quiz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizState {
    /// Index of the question currently awaiting an answer
    #[serde(alias = "q")]
    pub question_index: usize,
    /// Correct answers so far
    #[serde(default)]
    pub score: usize,
}

/// Counters and mode flags for one user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, alias = "dice")]
    pub dice_count: u64,

    /// Non-command text messages received
    #[serde(default, alias = "messages")]
    pub message_count: u64,

    /// Free text goes to the language model while set
    #[serde(default, alias = "chat_mode")]
    pub chat_mode: bool,

    /// Present only while a quiz is running
    #[serde(default)]
    pub quiz: Option<QuizState>,
}

impl UserRecord {
    /// Whether the user is in the middle of a quiz.
    pub fn quiz_active(&self) -> bool {
        self.quiz.is_some()
    }
}

/// Every user record, keyed by stringified user id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Store {
    users: BTreeMap<String, UserRecord>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a default record for `user_id` if absent and return it.
    ///
    /// Existing records are returned untouched.
    pub fn ensure_user(&mut self, user_id: &str) -> &mut UserRecord {
        self.users.entry(user_id.to_string()).or_default()
    }

    /// Replace the user's record with defaults.
    pub fn reset_user(&mut self, user_id: &str) -> &mut UserRecord {
        let record = self.ensure_user(user_id);
        *record = UserRecord::default();
        record
    }

    pub fn get(&self, user_id: &str) -> Option<&UserRecord> {
        self.users.get(user_id)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Clear quiz states that cannot be resumed with `question_count` questions.
    ///
    /// Returns the number of records that were repaired.
    pub fn normalize(&mut self, question_count: usize) -> usize {
        let mut repaired = 0;
        for (user_id, record) in &mut self.users {
            let Some(state) = record.quiz else {
                continue;
            };
            if state.question_index >= question_count || state.score > state.question_index {
                tracing::warn!(
                    user_id = %user_id,
                    question_index = state.question_index,
                    score = state.score,
                    "Dropping quiz state that no longer fits the question list"
                );
                record.quiz = None;
                repaired += 1;
            }
        }
        repaired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_user_inserts_defaults() {
        let mut store = Store::new();
        let record = store.ensure_user("42");
        assert_eq!(*record, UserRecord::default());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ensure_user_is_idempotent() {
        let mut store = Store::new();
        {
            let record = store.ensure_user("42");
            record.dice_count = 5;
            record.chat_mode = true;
            record.quiz = Some(QuizState {
                question_index: 1,
                score: 1,
            });
        }
        let before = store.clone();

        store.ensure_user("42");
        store.ensure_user("42");

        assert_eq!(store, before);
    }

    #[test]
    fn test_reset_user() {
        let mut store = Store::new();
        {
            let record = store.ensure_user("7");
            record.dice_count = 3;
            record.message_count = 9;
            record.chat_mode = true;
            record.quiz = Some(QuizState::default());
        }

        store.reset_user("7");

        let record = store.get("7").unwrap();
        assert_eq!(record.dice_count, 0);
        assert_eq!(record.message_count, 0);
        assert!(!record.chat_mode);
        assert!(record.quiz.is_none());
    }

    #[test]
    fn test_backfills_missing_optional_fields() {
        let store: Store = serde_json::from_str(r#"{ "1": { "diceCount": 2, "messageCount": 4 } }"#)
            .unwrap();
        let record = store.get("1").unwrap();
        assert_eq!(record.dice_count, 2);
        assert_eq!(record.message_count, 4);
        assert!(!record.chat_mode);
        assert!(record.quiz.is_none());
    }

    #[test]
    fn test_reads_legacy_field_names() {
        let legacy = r#"{
            "1001": { "dice": 3, "messages": 12, "chat_mode": true, "quiz": { "q": 1, "score": 1 } },
            "1002": { "dice": 0, "messages": 1 }
        }"#;
        let store: Store = serde_json::from_str(legacy).unwrap();

        let first = store.get("1001").unwrap();
        assert_eq!(first.dice_count, 3);
        assert_eq!(first.message_count, 12);
        assert!(first.chat_mode);
        assert_eq!(
            first.quiz,
            Some(QuizState {
                question_index: 1,
                score: 1
            })
        );
        assert!(!store.get("1002").unwrap().chat_mode);
    }

    #[test]
    fn test_writes_camel_case() {
        let mut store = Store::new();
        store.ensure_user("5").quiz = Some(QuizState {
            question_index: 2,
            score: 1,
        });
        let json = serde_json::to_value(&store).unwrap();
        assert_eq!(json["5"]["diceCount"], 0);
        assert_eq!(json["5"]["chatMode"], false);
        assert_eq!(json["5"]["quiz"]["questionIndex"], 2);
    }

    #[test]
    fn test_normalize_drops_invalid_quiz() {
        let mut store = Store::new();
        store.ensure_user("ok").quiz = Some(QuizState {
            question_index: 2,
            score: 2,
        });
        store.ensure_user("out_of_range").quiz = Some(QuizState {
            question_index: 3,
            score: 0,
        });
        store.ensure_user("bad_score").quiz = Some(QuizState {
            question_index: 0,
            score: 1,
        });

        assert_eq!(store.normalize(3), 2);
        assert!(store.get("ok").unwrap().quiz.is_some());
        assert!(store.get("out_of_range").unwrap().quiz.is_none());
        assert!(store.get("bad_score").unwrap().quiz.is_none());
    }
}
