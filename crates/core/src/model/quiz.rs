use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{CategoryId, QuestionId, QuizId};
use crate::model::question::{Question, ValidatedQuestion};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("time limit must be at least one minute")]
    InvalidTimeLimit,

    #[error("a quiz without questions cannot be published")]
    PublishEmpty,

    #[error("cannot remove the last question of a published quiz")]
    RemoveLastPublished,

    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A curated, ordered set of questions shown to end users once published.
///
/// Questions are embedded: they belong to exactly one quiz and their ids are
/// local to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quiz {
    id: QuizId,
    title: String,
    description: String,
    category_id: CategoryId,
    questions: Vec<Question>,
    time_limit_minutes: Option<u32>,
    published: bool,
    created_at: DateTime<Utc>,
}

impl Quiz {
    /// Creates an empty, unpublished quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyTitle` or `QuizError::InvalidTimeLimit`.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        description: impl Into<String>,
        category_id: CategoryId,
        time_limit_minutes: Option<u32>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if time_limit_minutes == Some(0) {
            return Err(QuizError::InvalidTimeLimit);
        }
        Ok(Self {
            id,
            title,
            description: description.into().trim().to_owned(),
            category_id,
            questions: Vec::new(),
            time_limit_minutes,
            published: false,
            created_at,
        })
    }

    /// Rehydrate a quiz from storage.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` if title/time limit are invalid, or if the quiz is
    /// marked published while holding no questions.
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: QuizId,
        title: String,
        description: String,
        category_id: CategoryId,
        questions: Vec<Question>,
        time_limit_minutes: Option<u32>,
        published: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, QuizError> {
        let mut quiz = Self::new(
            id,
            title,
            description,
            category_id,
            time_limit_minutes,
            created_at,
        )?;
        quiz.questions = questions;
        if published {
            quiz.publish()?;
        }
        Ok(quiz)
    }

    #[must_use]
    pub fn id(&self) -> QuizId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn time_limit_minutes(&self) -> Option<u32> {
        self.time_limit_minutes
    }

    /// Time limit in seconds, if the quiz is timed.
    #[must_use]
    pub fn time_limit_secs(&self) -> Option<u64> {
        self.time_limit_minutes.map(|m| u64::from(m) * 60)
    }

    #[must_use]
    pub fn is_published(&self) -> bool {
        self.published
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn with_id(mut self, id: QuizId) -> Self {
        self.id = id;
        self
    }

    /// Replace title, description, category and time limit.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyTitle` or `QuizError::InvalidTimeLimit`.
    pub fn update_details(
        &mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        category_id: CategoryId,
        time_limit_minutes: Option<u32>,
    ) -> Result<(), QuizError> {
        let title = title.into().trim().to_owned();
        if title.is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if time_limit_minutes == Some(0) {
            return Err(QuizError::InvalidTimeLimit);
        }
        self.title = title;
        self.description = description.into().trim().to_owned();
        self.category_id = category_id;
        self.time_limit_minutes = time_limit_minutes;
        Ok(())
    }

    /// Append a question, giving it the next quiz-local id.
    pub fn add_question(&mut self, question: ValidatedQuestion) -> QuestionId {
        let next = self
            .questions
            .iter()
            .map(|q| q.id().value())
            .max()
            .unwrap_or(0)
            + 1;
        let id = QuestionId::new(next);
        self.questions.push(question.assign_id(id));
        id
    }

    /// Remove a question by its quiz-local id.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::UnknownQuestion` if no such question exists, or
    /// `QuizError::RemoveLastPublished` if it would leave a published quiz empty.
    pub fn remove_question(&mut self, id: QuestionId) -> Result<Question, QuizError> {
        let index = self
            .questions
            .iter()
            .position(|q| q.id() == id)
            .ok_or(QuizError::UnknownQuestion(id))?;
        if self.published && self.questions.len() == 1 {
            return Err(QuizError::RemoveLastPublished);
        }
        Ok(self.questions.remove(index))
    }

    /// # Errors
    ///
    /// Returns `QuizError::PublishEmpty` when the quiz holds no questions.
    pub fn publish(&mut self) -> Result<(), QuizError> {
        if self.questions.is_empty() {
            return Err(QuizError::PublishEmpty);
        }
        self.published = true;
        Ok(())
    }

    pub fn unpublish(&mut self) {
        self.published = false;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::question::{Difficulty, QuestionDraft};
    use crate::time::fixed_now;

    fn quiz() -> Quiz {
        Quiz::new(
            QuizId::new(1),
            "Ownership",
            "Borrowing basics",
            CategoryId::new(1),
            Some(10),
            fixed_now(),
        )
        .unwrap()
    }

    fn question(prompt: &str) -> ValidatedQuestion {
        QuestionDraft {
            prompt: prompt.into(),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option: 0,
            explanation: String::new(),
            difficulty: Difficulty::Medium,
            category_id: None,
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn empty_quiz_cannot_be_published() {
        let mut q = quiz();
        assert_eq!(q.publish(), Err(QuizError::PublishEmpty));
        assert!(!q.is_published());
    }

    #[test]
    fn question_ids_are_quiz_local_and_increasing() {
        let mut q = quiz();
        let first = q.add_question(question("one"));
        let second = q.add_question(question("two"));
        assert_eq!(first, QuestionId::new(1));
        assert_eq!(second, QuestionId::new(2));
        q.remove_question(first).unwrap();
        let third = q.add_question(question("three"));
        assert_eq!(third, QuestionId::new(3));
    }

    #[test]
    fn published_quiz_keeps_its_last_question() {
        let mut q = quiz();
        let id = q.add_question(question("only"));
        q.publish().unwrap();
        assert_eq!(q.remove_question(id), Err(QuizError::RemoveLastPublished));
        q.unpublish();
        assert!(q.remove_question(id).is_ok());
    }

    #[test]
    fn zero_minute_limit_is_invalid() {
        let err = Quiz::new(
            QuizId::new(1),
            "T",
            "",
            CategoryId::new(1),
            Some(0),
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, QuizError::InvalidTimeLimit);
    }

    #[test]
    fn persisted_published_empty_quiz_is_rejected() {
        let err = Quiz::from_persisted(
            QuizId::new(3),
            "T".into(),
            String::new(),
            CategoryId::new(1),
            Vec::new(),
            None,
            true,
            fixed_now(),
        )
        .unwrap_err();
        assert_eq!(err, QuizError::PublishEmpty);
    }
}
