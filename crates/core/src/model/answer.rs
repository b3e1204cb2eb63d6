use serde::{Deserialize, Serialize};

use crate::model::ids::QuestionId;

/// Outcome recorded for one question of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AnswerState {
    #[default]
    Unanswered,
    Answered {
        option: usize,
        correct: bool,
    },
    Skipped,
}

/// One ledger entry: the answer state plus the review bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    question_id: QuestionId,
    state: AnswerState,
    marked_for_review: bool,
}

impl UserAnswer {
    /// Fresh, untouched entry for a question.
    #[must_use]
    pub fn new(question_id: QuestionId) -> Self {
        Self {
            question_id,
            state: AnswerState::Unanswered,
            marked_for_review: false,
        }
    }

    #[must_use]
    pub fn from_parts(question_id: QuestionId, state: AnswerState, marked_for_review: bool) -> Self {
        Self {
            question_id,
            state,
            marked_for_review,
        }
    }

    #[must_use]
    pub fn question_id(&self) -> QuestionId {
        self.question_id
    }

    #[must_use]
    pub fn state(&self) -> AnswerState {
        self.state
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        match self.state {
            AnswerState::Answered { option, .. } => Some(option),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_correct(&self) -> bool {
        matches!(self.state, AnswerState::Answered { correct: true, .. })
    }

    #[must_use]
    pub fn is_answered(&self) -> bool {
        matches!(self.state, AnswerState::Answered { .. })
    }

    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self.state, AnswerState::Skipped)
    }

    #[must_use]
    pub fn is_unanswered(&self) -> bool {
        matches!(self.state, AnswerState::Unanswered)
    }

    #[must_use]
    pub fn is_marked_for_review(&self) -> bool {
        self.marked_for_review
    }

    /// Record a selection. Supersedes a skip.
    pub fn answer(&mut self, option: usize, correct: bool) {
        self.state = AnswerState::Answered { option, correct };
    }

    /// Mark as skipped unless an answer is already recorded.
    ///
    /// Returns true if the state changed.
    pub fn skip(&mut self) -> bool {
        if self.is_unanswered() {
            self.state = AnswerState::Skipped;
            true
        } else {
            false
        }
    }

    pub fn toggle_mark(&mut self) {
        self.marked_for_review = !self.marked_for_review;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn answer_supersedes_skip() {
        let mut a = UserAnswer::new(QuestionId::new(1));
        assert!(a.skip());
        a.answer(2, true);
        assert!(!a.is_skipped());
        assert_eq!(a.selected_option(), Some(2));
        assert!(a.is_correct());
    }

    #[test]
    fn skip_never_overwrites_an_answer() {
        let mut a = UserAnswer::new(QuestionId::new(1));
        a.answer(0, false);
        assert!(!a.skip());
        assert_eq!(a.selected_option(), Some(0));
    }

    #[test]
    fn skip_is_idempotent() {
        let mut a = UserAnswer::new(QuestionId::new(1));
        assert!(a.skip());
        assert!(!a.skip());
        assert!(a.is_skipped());
    }

    #[test]
    fn mark_is_orthogonal_to_state() {
        let mut a = UserAnswer::new(QuestionId::new(4));
        a.toggle_mark();
        a.answer(1, false);
        assert!(a.is_marked_for_review());
        a.toggle_mark();
        assert!(!a.is_marked_for_review());
        assert!(a.is_answered());
    }
}
