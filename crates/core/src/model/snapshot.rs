//! Wire form of an in-progress test session.
//!
//! The JSON layout is shared with the browser build, which keeps progress in
//! local storage under the same field names:
//!
//! ```json
//! {
//!   "currentQuestionIndex": 2,
//!   "userAnswers": [
//!     { "questionId": 7, "selectedOption": 1, "isCorrect": true,
//!       "isSkipped": false, "isMarkedForReview": false }
//!   ],
//!   "isTestStarted": true,
//!   "remainingTime": 18
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::answer::{AnswerState, UserAnswer};
use crate::model::ids::QuestionId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Malformed(String),

    #[error("snapshot pointer {index} is outside a ledger of {len}")]
    PointerOutOfRange { index: usize, len: usize },

    #[error("snapshot ledger is empty")]
    EmptyLedger,
}

/// One ledger entry in wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotAnswer {
    pub question_id: QuestionId,
    pub selected_option: Option<usize>,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default)]
    pub is_skipped: bool,
    #[serde(default)]
    pub is_marked_for_review: bool,
}

impl From<&UserAnswer> for SnapshotAnswer {
    fn from(answer: &UserAnswer) -> Self {
        Self {
            question_id: answer.question_id(),
            selected_option: answer.selected_option(),
            is_correct: answer.is_correct(),
            is_skipped: answer.is_skipped(),
            is_marked_for_review: answer.is_marked_for_review(),
        }
    }
}

impl SnapshotAnswer {
    /// Convert back to the tagged ledger form.
    ///
    /// A recorded selection wins over a stale skip flag.
    #[must_use]
    pub fn to_user_answer(&self) -> UserAnswer {
        let state = match (self.selected_option, self.is_skipped) {
            (Some(option), _) => AnswerState::Answered {
                option,
                correct: self.is_correct,
            },
            (None, true) => AnswerState::Skipped,
            (None, false) => AnswerState::Unanswered,
        };
        UserAnswer::from_parts(self.question_id, state, self.is_marked_for_review)
    }
}

/// Serialized progress of a mock test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub current_question_index: usize,
    pub user_answers: Vec<SnapshotAnswer>,
    pub is_test_started: bool,
    pub remaining_time: u32,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_test_completed: bool,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(
        current_question_index: usize,
        answers: &[UserAnswer],
        remaining_time: u32,
    ) -> Self {
        Self {
            current_question_index,
            user_answers: answers.iter().map(SnapshotAnswer::from).collect(),
            is_test_started: true,
            remaining_time,
            is_test_completed: false,
        }
    }

    /// True when the snapshot describes a resumable session.
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.is_test_started && !self.is_test_completed
    }

    #[must_use]
    pub fn ledger(&self) -> Vec<UserAnswer> {
        self.user_answers
            .iter()
            .map(SnapshotAnswer::to_user_answer)
            .collect()
    }

    /// # Errors
    ///
    /// Returns `SnapshotError::Malformed` if serialization fails.
    pub fn encode(&self) -> Result<String, SnapshotError> {
        serde_json::to_string(self).map_err(|e| SnapshotError::Malformed(e.to_string()))
    }

    /// Parse and structurally check a snapshot.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Malformed` for invalid JSON,
    /// `SnapshotError::EmptyLedger` or `SnapshotError::PointerOutOfRange` for
    /// shapes no session could have produced.
    pub fn decode(raw: &str) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            serde_json::from_str(raw).map_err(|e| SnapshotError::Malformed(e.to_string()))?;
        let len = snapshot.user_answers.len();
        if len == 0 {
            return Err(SnapshotError::EmptyLedger);
        }
        if snapshot.current_question_index >= len {
            return Err(SnapshotError::PointerOutOfRange {
                index: snapshot.current_question_index,
                len,
            });
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger() -> Vec<UserAnswer> {
        let mut answered = UserAnswer::new(QuestionId::new(7));
        answered.answer(1, true);
        let mut skipped = UserAnswer::new(QuestionId::new(3));
        skipped.skip();
        skipped.toggle_mark();
        vec![answered, skipped, UserAnswer::new(QuestionId::new(5))]
    }

    #[test]
    fn round_trip_preserves_every_field() {
        let snapshot = SessionSnapshot::capture(2, &ledger(), 18);
        let decoded = SessionSnapshot::decode(&snapshot.encode().unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
        assert_eq!(decoded.ledger(), ledger());
    }

    #[test]
    fn uses_camel_case_field_names_and_explicit_nulls() {
        let json = SessionSnapshot::capture(0, &ledger(), 30).encode().unwrap();
        assert!(json.contains("\"currentQuestionIndex\":0"));
        assert!(json.contains("\"selectedOption\":null"));
        assert!(json.contains("\"isMarkedForReview\":true"));
        assert!(!json.contains("isTestCompleted"));
    }

    #[test]
    fn accepts_payload_without_completion_flag() {
        let raw = r#"{
            "currentQuestionIndex": 1,
            "userAnswers": [
                {"questionId": 1, "selectedOption": 0, "isCorrect": false, "isSkipped": false, "isMarkedForReview": false},
                {"questionId": 2, "selectedOption": null, "isCorrect": false, "isSkipped": false, "isMarkedForReview": false}
            ],
            "isTestStarted": true,
            "remainingTime": 12
        }"#;
        let snapshot = SessionSnapshot::decode(raw).unwrap();
        assert!(snapshot.is_in_progress());
        assert_eq!(snapshot.remaining_time, 12);
    }

    #[test]
    fn selection_wins_over_stale_skip_flag() {
        let wire = SnapshotAnswer {
            question_id: QuestionId::new(1),
            selected_option: Some(3),
            is_correct: false,
            is_skipped: true,
            is_marked_for_review: false,
        };
        let answer = wire.to_user_answer();
        assert!(!answer.is_skipped());
        assert_eq!(answer.selected_option(), Some(3));
    }

    #[test]
    fn rejects_pointer_past_ledger() {
        let mut snapshot = SessionSnapshot::capture(0, &ledger(), 30);
        snapshot.current_question_index = 3;
        let err = SessionSnapshot::decode(&snapshot.encode().unwrap()).unwrap_err();
        assert_eq!(err, SnapshotError::PointerOutOfRange { index: 3, len: 3 });
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            SessionSnapshot::decode("{not json"),
            Err(SnapshotError::Malformed(_))
        ));
    }
}
