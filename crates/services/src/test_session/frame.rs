use quiz_core::model::{Question, UserAnswer};
use quiz_core::review::Review;

use super::machine::Phase;

/// Read-only copy of session state for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionFrame {
    pub phase: Phase,
    pub pointer: usize,
    pub total: usize,
    pub remaining: u32,
    pub budget: u32,
    pub question: Option<Question>,
    pub answers: Vec<UserAnswer>,
    pub score: Option<u32>,
    pub review: Option<Review>,
    pub restored: bool,
    pub epoch: u64,
}

impl SessionFrame {
    #[must_use]
    pub fn current_answer(&self) -> Option<&UserAnswer> {
        self.answers.get(self.pointer)
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.pointer + 1 >= self.total
    }

    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_answered()).count()
    }

    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.answers.iter().filter(|a| a.is_skipped()).count()
    }

    #[must_use]
    pub fn marked_count(&self) -> usize {
        self.answers
            .iter()
            .filter(|a| a.is_marked_for_review())
            .count()
    }
}
