use services::Notice;

use crate::vm::test_vm::LETTERS;

/// One-line message for a session notice.
#[must_use]
pub fn notice_text(notice: Notice) -> String {
    match notice {
        Notice::ProgressRestored => "Resumed your test where you left off.".to_owned(),
        Notice::AnswerCorrect => "Correct!".to_owned(),
        Notice::AnswerIncorrect { correct_option } => match LETTERS.get(correct_option) {
            Some(letter) => format!("Incorrect. The answer was {letter}."),
            None => "Incorrect.".to_owned(),
        },
        Notice::TimeUp => "Time's up! Moving to the next question.".to_owned(),
        Notice::Unanswered { count: 1 } => "1 unanswered question was marked as skipped.".to_owned(),
        Notice::Unanswered { count } => {
            format!("{count} unanswered questions were marked as skipped.")
        }
        Notice::Completed { score, total } => format!("Test complete: {score} of {total} correct."),
    }
}
