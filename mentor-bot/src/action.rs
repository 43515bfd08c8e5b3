//! Typed commands and button actions.

use std::fmt;

/// Slash commands the bot understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Stats,
    Reset,
    Quiz,
    Roll,
}

impl Command {
    /// Parse a command name (already stripped of `/` and `@botname`).
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "start" => Some(Self::Start),
            "help" => Some(Self::Help),
            "stats" => Some(Self::Stats),
            "reset" => Some(Self::Reset),
            "quiz" => Some(Self::Quiz),
            "roll" => Some(Self::Roll),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Help => "help",
            Self::Stats => "stats",
            Self::Reset => "reset",
            Self::Quiz => "quiz",
            Self::Roll => "roll",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.as_str())
    }
}

/// Inline keyboard actions, identified by their callback data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    RollDice,
    Help,
    EnableChat,
    BackToMenu,
    StartQuiz,
    ShowStats,
    ResetStats,
}

impl Action {
    /// Exact match on callback data. Anything else is `None`.
    pub fn from_callback_data(data: &str) -> Option<Self> {
        match data {
            "ROLL_DICE" => Some(Self::RollDice),
            "HELP" => Some(Self::Help),
            "GPT_CHAT" => Some(Self::EnableChat),
            "BACK_TO_MENU" => Some(Self::BackToMenu),
            "QUIZ_START" => Some(Self::StartQuiz),
            "STATS" => Some(Self::ShowStats),
            "RESET" => Some(Self::ResetStats),
            _ => None,
        }
    }

    /// Callback data sent with the button.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RollDice => "ROLL_DICE",
            Self::Help => "HELP",
            Self::EnableChat => "GPT_CHAT",
            Self::BackToMenu => "BACK_TO_MENU",
            Self::StartQuiz => "QUIZ_START",
            Self::ShowStats => "STATS",
            Self::ResetStats => "RESET",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
