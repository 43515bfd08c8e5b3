//! Reply texts and keyboards.

use crate::action::Action;
use crate::message::{InlineButton, Keyboard, Reply};
use crate::session::UserRecord;

fn button(label: &str, action: Action) -> Vec<InlineButton> {
    vec![InlineButton::new(label, action.as_str())]
}

/// Dice, help, assistant and quiz, one button per row.
pub fn main_menu() -> Keyboard {
    vec![
        button("🎲 Dice", Action::RollDice),
        button("📚 Help", Action::Help),
        button("🧠 Assistant", Action::EnableChat),
        button("🎯 Quiz", Action::StartQuiz),
    ]
}

/// Single "back to menu" button.
pub fn back_menu() -> Keyboard {
    vec![button("🔙 Back to menu", Action::BackToMenu)]
}

pub fn greeting(name: &str, chat_mode: bool) -> Reply {
    let state = if chat_mode { "enabled" } else { "disabled" };
    Reply::with_keyboard(
        format!(
            "Hello, {name}! 👋\n\
             Assistant mode is currently {state}.\n\
             Press a button below to get started."
        ),
        main_menu(),
    )
}

pub fn help() -> Reply {
    Reply::with_keyboard(
        "I can:\n\
         • /start — menu\n\
         • /stats — your statistics\n\
         • /reset — reset your statistics\n\
         • /quiz — start the quiz\n\
         • /roll — roll a die\n\
         • 🎲 Dice, 🧠 Assistant (buttons)\n\n\
         In assistant mode just write messages and the language model will answer.",
        main_menu(),
    )
}

pub fn dice(value: u8) -> Reply {
    Reply::text(format!("🎲 You rolled: {value}"))
}

pub fn chat_enabled() -> Reply {
    Reply::with_keyboard(
        "🧠 Assistant mode enabled.\n\
         Ask your question and the language model will answer.\n\
         To leave, press \"🔙 Back to menu\".",
        back_menu(),
    )
}

pub fn back_to_menu() -> Reply {
    Reply::with_keyboard("Back to the main menu.", main_menu())
}

pub fn quiz_started(first_question: &str) -> Reply {
    Reply::text(format!("📝 Quiz started!\nQuestion 1: {first_question}"))
}

pub fn verdict(correct: bool) -> Reply {
    Reply::text(if correct { "✅ Correct!" } else { "❌ Incorrect." })
}

/// `index` is zero-based.
pub fn question(index: usize, text: &str) -> Reply {
    Reply::text(format!("Question {}: {text}", index + 1))
}

pub fn quiz_finished(score: usize, total: usize) -> Reply {
    Reply::text(format!("🏁 Quiz finished! Your score: {score}/{total}"))
}

pub fn assistant_answer(answer: String) -> Reply {
    Reply::with_keyboard(answer, back_menu())
}

pub fn echo(text: &str) -> Reply {
    Reply::with_keyboard(format!("You wrote: \"{text}\""), main_menu())
}

pub fn stats(record: &UserRecord) -> Reply {
    Reply::text(format!(
        "📊 Your stats:\n— dice rolls: {}\n— messages: {}",
        record.dice_count, record.message_count
    ))
}

pub fn reset_done() -> Reply {
    Reply::with_keyboard("♻️ Your stats have been reset.", main_menu())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_main_menu_layout() {
        let menu = main_menu();
        assert_eq!(menu.len(), 4);
        assert!(menu.iter().all(|row| row.len() == 1));
        let ids: Vec<_> = menu.iter().map(|r| r[0].callback_data.as_str()).collect();
        assert_eq!(ids, ["ROLL_DICE", "HELP", "GPT_CHAT", "QUIZ_START"]);
    }

    #[test]
    fn test_back_menu_layout() {
        let menu = back_menu();
        assert_eq!(menu.len(), 1);
        assert_eq!(menu[0][0].callback_data, "BACK_TO_MENU");
    }

    #[test]
    fn test_greeting_reports_mode() {
        assert!(greeting("Ada", false).text.contains("disabled"));
        assert!(greeting("Ada", true).text.contains("enabled"));
        assert!(greeting("Ada", true).text.starts_with("Hello, Ada!"));
    }

    #[test]
    fn test_question_numbering_is_one_based() {
        assert_eq!(question(1, "Q2").text, "Question 2: Q2");
    }

    #[test]
    fn test_echo_quotes_text() {
        let reply = echo("hi");
        assert_eq!(reply.text, "You wrote: \"hi\"");
        assert_eq!(reply.keyboard, Some(main_menu()));
    }
}
