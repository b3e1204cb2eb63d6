use quiz_core::model::{AnswerState, OPTION_COUNT, UserAnswer};
use services::{Phase, SessionFrame};

use crate::vm::markdown_vm::markdown_to_plain;
use crate::vm::time_fmt::format_countdown;

/// At or below this many seconds the timer is shown as urgent.
pub const LOW_TIME_SECS: u32 = 10;

pub(crate) const LETTERS: [char; OPTION_COUNT] = ['A', 'B', 'C', 'D'];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OptionMark {
    Neutral,
    Correct,
    Incorrect,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRowVm {
    pub index: usize,
    pub letter: char,
    pub text: String,
    pub selected: bool,
    pub mark: OptionMark,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChipStatus {
    Current,
    Answered,
    Skipped,
    Unvisited,
}

/// One cell of the question overview grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChipVm {
    pub number: usize,
    pub status: ChipStatus,
    pub marked: bool,
}

/// Everything the test screen shows for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestScreenVm {
    pub phase: Phase,
    pub progress_label: String,
    pub timer_label: String,
    pub low_time: bool,
    pub prompt: String,
    pub difficulty_label: &'static str,
    pub options: Vec<OptionRowVm>,
    /// Options can no longer be chosen.
    pub locked: bool,
    pub marked: bool,
    /// Shown once the question has been answered.
    pub explanation: Option<String>,
    pub chips: Vec<ChipVm>,
    pub tally_label: String,
    pub can_go_previous: bool,
    pub is_last: bool,
}

impl TestScreenVm {
    #[must_use]
    pub fn from_frame(frame: &SessionFrame) -> Self {
        let answer = frame.current_answer().copied();
        let answered = answer.is_some_and(|a| a.is_answered());

        let (prompt, difficulty_label, options, explanation) = match &frame.question {
            Some(question) => {
                let options = question
                    .options()
                    .iter()
                    .enumerate()
                    .map(|(index, text)| OptionRowVm {
                        index,
                        letter: LETTERS[index],
                        text: text.clone(),
                        selected: answer.and_then(|a| a.selected_option()) == Some(index),
                        mark: option_mark(answer, index, question.correct_option()),
                    })
                    .collect();
                let explanation = (answered && !question.explanation().is_empty())
                    .then(|| markdown_to_plain(question.explanation()));
                (
                    question.prompt().to_owned(),
                    question.difficulty().as_str(),
                    options,
                    explanation,
                )
            }
            None => (String::new(), "", Vec::new(), None),
        };

        let chips = frame
            .answers
            .iter()
            .enumerate()
            .map(|(index, a)| ChipVm {
                number: index + 1,
                status: chip_status(a, index == frame.pointer),
                marked: a.is_marked_for_review(),
            })
            .collect();

        Self {
            phase: frame.phase,
            progress_label: format!("Question {} of {}", frame.pointer + 1, frame.total),
            timer_label: format_countdown(frame.remaining),
            low_time: frame.phase == Phase::InProgress && frame.remaining <= LOW_TIME_SECS,
            prompt,
            difficulty_label,
            options,
            locked: answered || frame.phase != Phase::InProgress,
            marked: answer.is_some_and(|a| a.is_marked_for_review()),
            explanation,
            chips,
            tally_label: format!(
                "{} answered, {} skipped, {} marked",
                frame.answered_count(),
                frame.skipped_count(),
                frame.marked_count()
            ),
            can_go_previous: frame.phase == Phase::InProgress && frame.pointer > 0,
            is_last: frame.is_last(),
        }
    }
}

fn option_mark(answer: Option<UserAnswer>, index: usize, correct_option: usize) -> OptionMark {
    match answer.map(|a| a.state()) {
        Some(AnswerState::Answered { option, .. }) => {
            if index == correct_option {
                OptionMark::Correct
            } else if index == option {
                OptionMark::Incorrect
            } else {
                OptionMark::Neutral
            }
        }
        _ => OptionMark::Neutral,
    }
}

fn chip_status(answer: &UserAnswer, current: bool) -> ChipStatus {
    if current {
        ChipStatus::Current
    } else if answer.is_answered() {
        ChipStatus::Answered
    } else if answer.is_skipped() {
        ChipStatus::Skipped
    } else {
        ChipStatus::Unvisited
    }
}
