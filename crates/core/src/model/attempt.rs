use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{QuizId, UserId};
use crate::model::quiz::Quiz;
use crate::review::rounded_percentage;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AttemptError {
    #[error("attempt has no questions")]
    Empty,

    #[error("outcome counts ({sum}) do not match total ({total})")]
    CountMismatch { total: u32, sum: u32 },

    #[error("expected {expected} answers, got {actual}")]
    AnswerCountMismatch { expected: usize, actual: usize },

    #[error("too many questions for a single attempt: {len}")]
    TooManyQuestions { len: usize },
}

/// A finished run through a published quiz. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAttempt {
    user_id: UserId,
    quiz_id: QuizId,
    correct: u32,
    incorrect: u32,
    skipped: u32,
    total: u32,
    time_taken_secs: u64,
    exceeded_time_limit: bool,
    completed_at: DateTime<Utc>,
}

impl QuizAttempt {
    /// Rehydrate an attempt from storage.
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::CountMismatch` if the outcome counts do not add up,
    /// or `AttemptError::Empty` if the total is zero.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        user_id: UserId,
        quiz_id: QuizId,
        correct: u32,
        incorrect: u32,
        skipped: u32,
        total: u32,
        time_taken_secs: u64,
        exceeded_time_limit: bool,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        if total == 0 {
            return Err(AttemptError::Empty);
        }
        let sum = correct.saturating_add(incorrect).saturating_add(skipped);
        if sum != total {
            return Err(AttemptError::CountMismatch { total, sum });
        }
        Ok(Self {
            user_id,
            quiz_id,
            correct,
            incorrect,
            skipped,
            total,
            time_taken_secs,
            exceeded_time_limit,
            completed_at,
        })
    }

    /// Grade `answers` (one slot per quiz question, `None` = skipped).
    ///
    /// # Errors
    ///
    /// Returns `AttemptError::AnswerCountMismatch` if `answers` is not
    /// index-aligned with the quiz questions, `AttemptError::Empty` for a quiz
    /// without questions.
    pub fn grade(
        user_id: UserId,
        quiz: &Quiz,
        answers: &[Option<usize>],
        time_taken_secs: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<Self, AttemptError> {
        let questions = quiz.questions();
        if answers.len() != questions.len() {
            return Err(AttemptError::AnswerCountMismatch {
                expected: questions.len(),
                actual: answers.len(),
            });
        }

        let mut correct = 0_u32;
        let mut incorrect = 0_u32;
        let mut skipped = 0_u32;
        for (question, answer) in questions.iter().zip(answers) {
            match answer {
                Some(option) if question.is_correct(*option) => correct += 1,
                Some(_) => incorrect += 1,
                None => skipped += 1,
            }
        }

        let total = u32::try_from(questions.len()).map_err(|_| AttemptError::TooManyQuestions {
            len: questions.len(),
        })?;
        let exceeded_time_limit = quiz
            .time_limit_secs()
            .is_some_and(|limit| time_taken_secs > limit);

        Self::from_persisted(
            user_id,
            quiz.id(),
            correct,
            incorrect,
            skipped,
            total,
            time_taken_secs,
            exceeded_time_limit,
            completed_at,
        )
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn quiz_id(&self) -> QuizId {
        self.quiz_id
    }

    /// Score is the number of correct answers.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn correct(&self) -> u32 {
        self.correct
    }

    #[must_use]
    pub fn incorrect(&self) -> u32 {
        self.incorrect
    }

    #[must_use]
    pub fn skipped(&self) -> u32 {
        self.skipped
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }

    #[must_use]
    pub fn time_taken_secs(&self) -> u64 {
        self.time_taken_secs
    }

    #[must_use]
    pub fn exceeded_time_limit(&self) -> bool {
        self.exceeded_time_limit
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    /// Score as a whole percentage, rounded to nearest.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        rounded_percentage(self.correct, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::CategoryId;
    use crate::model::question::{Difficulty, QuestionDraft};
    use crate::time::fixed_now;

    fn quiz_with(n: usize, limit: Option<u32>) -> Quiz {
        let mut quiz = Quiz::new(
            QuizId::new(9),
            "Traits",
            "",
            CategoryId::new(1),
            limit,
            fixed_now(),
        )
        .unwrap();
        for i in 0..n {
            quiz.add_question(
                QuestionDraft {
                    prompt: format!("Q{i}"),
                    options: ["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_option: i % 4,
                    explanation: String::new(),
                    difficulty: Difficulty::Easy,
                    category_id: None,
                }
                .validate()
                .unwrap(),
            );
        }
        quiz
    }

    #[test]
    fn grade_counts_each_outcome() {
        let quiz = quiz_with(4, None);
        let answers = [Some(0), Some(0), None, Some(3)];
        let attempt =
            QuizAttempt::grade(UserId::random(), &quiz, &answers, 42, fixed_now()).unwrap();
        assert_eq!(attempt.correct(), 2);
        assert_eq!(attempt.incorrect(), 1);
        assert_eq!(attempt.skipped(), 1);
        assert_eq!(attempt.score(), 2);
        assert_eq!(attempt.percentage(), 50);
        assert!(!attempt.exceeded_time_limit());
    }

    #[test]
    fn grade_flags_time_limit_overrun() {
        let quiz = quiz_with(1, Some(1));
        let attempt =
            QuizAttempt::grade(UserId::random(), &quiz, &[Some(0)], 61, fixed_now()).unwrap();
        assert!(attempt.exceeded_time_limit());
    }

    #[test]
    fn grade_requires_aligned_answers() {
        let quiz = quiz_with(3, None);
        let err = QuizAttempt::grade(UserId::random(), &quiz, &[None], 1, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            AttemptError::AnswerCountMismatch {
                expected: 3,
                actual: 1
            }
        );
    }

    #[test]
    fn persisted_counts_must_add_up() {
        let err = QuizAttempt::from_persisted(
            UserId::random(),
            QuizId::new(1),
            1,
            1,
            1,
            4,
            0,
            false,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, AttemptError::CountMismatch { total: 4, sum: 3 });
    }

    #[test]
    fn percentage_of_very_large_attempt() {
        let attempt = QuizAttempt::from_persisted(
            UserId::random(),
            QuizId::new(1),
            90_000_000,
            10_000_000,
            0,
            100_000_000,
            0,
            false,
            fixed_now(),
        )
        .unwrap();
        assert_eq!(attempt.percentage(), 90);
    }
}
