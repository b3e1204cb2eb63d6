use std::sync::Arc;

use quiz_core::model::{Difficulty, Question, QuestionDraft, QuestionId};
use storage::repository::{CategoryRepository, QuestionRepository};
use tracing::debug;

use crate::error::QuestionBankError;

/// Number of bank questions per difficulty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DifficultyCounts {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl DifficultyCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }
}

/// Maintains the mock-test question bank.
#[derive(Clone)]
pub struct QuestionBankService {
    questions: Arc<dyn QuestionRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl QuestionBankService {
    #[must_use]
    pub fn new(
        questions: Arc<dyn QuestionRepository>,
        categories: Arc<dyn CategoryRepository>,
    ) -> Self {
        Self {
            questions,
            categories,
        }
    }

    /// Validate a draft and add it to the bank.
    ///
    /// # Errors
    ///
    /// Returns `QuestionBankError::Question` for invalid drafts,
    /// `QuestionBankError::UnknownCategory` when the draft names a missing
    /// category.
    pub async fn add_question(&self, draft: QuestionDraft) -> Result<QuestionId, QuestionBankError> {
        let validated = draft.validate()?;
        if let Some(category) = validated.category_id {
            if self.categories.get_category(category).await?.is_none() {
                return Err(QuestionBankError::UnknownCategory(category));
            }
        }
        let question = validated.assign_id(QuestionId::new(0));
        let id = self.questions.insert_question(&question).await?;
        debug!(question_id = %id, difficulty = %question.difficulty(), "bank question added");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` if repository access fails.
    pub async fn list_questions(&self) -> Result<Vec<Question>, QuestionBankError> {
        Ok(self.questions.list_questions().await?)
    }

    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` (`NotFound` included).
    pub async fn delete_question(&self, id: QuestionId) -> Result<(), QuestionBankError> {
        self.questions.delete_question(id).await?;
        debug!(question_id = %id, "bank question deleted");
        Ok(())
    }

    /// # Errors
    ///
    /// Returns `QuestionBankError::Storage` if repository access fails.
    pub async fn counts(&self) -> Result<DifficultyCounts, QuestionBankError> {
        let mut counts = DifficultyCounts::default();
        for question in self.questions.list_questions().await? {
            match question.difficulty() {
                Difficulty::Easy => counts.easy += 1,
                Difficulty::Medium => counts.medium += 1,
                Difficulty::Hard => counts.hard += 1,
            }
        }
        Ok(counts)
    }
}
