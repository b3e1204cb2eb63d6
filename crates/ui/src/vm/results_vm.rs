use quiz_core::model::{AnswerState, Difficulty};
use quiz_core::review::{Review, ReviewItem, rounded_percentage};

use crate::vm::markdown_vm::{markdown_to_html, markdown_to_plain};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DifficultyRowVm {
    pub label: &'static str,
    pub correct: u32,
    pub total: u32,
    /// `None` when no question of this difficulty was asked.
    pub percentage: Option<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemStatus {
    Correct,
    Incorrect,
    Skipped,
    Unattempted,
}

impl ItemStatus {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ItemStatus::Correct => "correct",
            ItemStatus::Incorrect => "incorrect",
            ItemStatus::Skipped => "skipped",
            ItemStatus::Unattempted => "not attempted",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewItemVm {
    pub number: usize,
    pub prompt: String,
    pub status: ItemStatus,
    pub marked: bool,
    pub your_answer: Option<String>,
    pub correct_answer: String,
    pub explanation_html: String,
    pub explanation_text: String,
}

impl ReviewItemVm {
    fn new(number: usize, item: &ReviewItem) -> Self {
        let question = &item.question;
        let (status, selected) = match item.answer.state() {
            AnswerState::Answered { option, correct } => (
                if correct {
                    ItemStatus::Correct
                } else {
                    ItemStatus::Incorrect
                },
                Some(option),
            ),
            AnswerState::Skipped => (ItemStatus::Skipped, None),
            AnswerState::Unanswered => (ItemStatus::Unattempted, None),
        };

        Self {
            number,
            prompt: question.prompt().to_owned(),
            status,
            marked: item.answer.is_marked_for_review(),
            your_answer: selected.and_then(|o| question.option(o)).map(str::to_owned),
            correct_answer: question
                .option(question.correct_option())
                .unwrap_or_default()
                .to_owned(),
            explanation_html: markdown_to_html(question.explanation()),
            explanation_text: markdown_to_plain(question.explanation()),
        }
    }
}

/// The results screen for a completed test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResultsVm {
    pub score_label: String,
    pub percentage_label: String,
    pub tier_label: &'static str,
    pub recommendation: &'static str,
    pub correct: u32,
    pub incorrect: u32,
    pub skipped: u32,
    pub marked: u32,
    pub difficulty_rows: Vec<DifficultyRowVm>,
    pub items: Vec<ReviewItemVm>,
}

impl From<&Review> for ResultsVm {
    fn from(review: &Review) -> Self {
        let difficulty_rows = Difficulty::ALL
            .into_iter()
            .map(|difficulty| {
                let b = review.breakdown(difficulty);
                DifficultyRowVm {
                    label: difficulty.as_str(),
                    correct: b.correct,
                    total: b.total,
                    percentage: (b.total > 0).then(|| rounded_percentage(b.correct, b.total)),
                }
            })
            .collect();

        Self {
            score_label: format!("{} / {}", review.correct, review.total),
            percentage_label: format!("{}%", review.percentage),
            tier_label: review.tier.label(),
            recommendation: review.recommendation.message(),
            correct: review.correct,
            incorrect: review.incorrect,
            // The review keeps never-visited questions apart; the screen does not.
            skipped: review.skipped + review.unattempted,
            marked: review.marked,
            difficulty_rows,
            items: review
                .items
                .iter()
                .enumerate()
                .map(|(i, item)| ReviewItemVm::new(i + 1, item))
                .collect(),
        }
    }
}
