//! Linear quiz state machine.
//!
//! A user is either not in a quiz (`UserRecord::quiz == None`) or awaiting an
//! answer to question `i` with `s` correct answers so far. Each graded answer
//! moves to `i + 1`; answering the last question finishes the quiz, which
//! immediately returns the user to "not started".
//!
//! Grading is delegated to the language model. Its verdict counts as correct
//! when it starts (case-insensitively) with the affirmative token, so any
//! ambiguity in the model's reply resolves the way the model phrases it.

use crate::session::QuizState;
use mentor_common::QuizConfig;

/// Result of grading one answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizStep {
    /// More questions remain.
    Next { state: QuizState, question: String },
    /// The last question was answered.
    Finished { score: usize, total: usize },
}

/// Fixed question list plus the grading rule.
#[derive(Debug, Clone)]
pub struct Quiz {
    questions: Vec<String>,
    affirmative_token: String,
}

impl Quiz {
    /// Build a quiz. Returns `None` when there are no questions.
    pub fn new(questions: Vec<String>, affirmative_token: impl Into<String>) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        Some(Self {
            questions,
            affirmative_token: affirmative_token.into(),
        })
    }

    pub fn from_config(config: &QuizConfig) -> Option<Self> {
        Self::new(config.questions.clone(), config.affirmative_token.clone())
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn question(&self, index: usize) -> Option<&str> {
        self.questions.get(index).map(String::as_str)
    }

    /// Fresh state plus the first question.
    pub fn start(&self) -> (QuizState, &str) {
        (QuizState::default(), &self.questions[0])
    }

    /// Prompt asking the model to judge `answer` for the current question.
    ///
    /// `None` if the state points past the question list.
    pub fn grading_prompt(&self, state: &QuizState, answer: &str) -> Option<String> {
        let question = self.question(state.question_index)?;
        Some(format!(
            "Question: {question}\n\
             Student answer: {answer}\n\
             Is the answer correct? Reply with only '{}' or 'no'.",
            self.affirmative_token
        ))
    }

    /// Whether the model's verdict counts as a correct answer.
    pub fn is_affirmative(&self, verdict: &str) -> bool {
        verdict
            .trim_start()
            .to_lowercase()
            .starts_with(&self.affirmative_token.to_lowercase())
    }

    /// Move past the current question.
    pub fn advance(&self, state: QuizState, correct: bool) -> QuizStep {
        let score = state.score + usize::from(correct);
        let next_index = state.question_index + 1;

        match self.questions.get(next_index) {
            Some(question) => QuizStep::Next {
                state: QuizState {
                    question_index: next_index,
                    score,
                },
                question: question.clone(),
            },
            None => QuizStep::Finished {
                score,
                total: self.len(),
            },
        }
    }
}

impl Default for Quiz {
    fn default() -> Self {
        let config = QuizConfig::default();
        Self {
            questions: config.questions,
            affirmative_token: config.affirmative_token,
        }
    }
}
