//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{
    AttemptError, CategoryError, CategoryId, QuestionError, QuizError, QuizId,
};
use storage::repository::StorageError;

/// Errors emitted by `CategoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CategoryServiceError {
    #[error("a category named {0:?} already exists")]
    DuplicateName(String),
    #[error("category {0} still has quizzes")]
    InUse(CategoryId),
    #[error("category {0} not found")]
    NotFound(CategoryId),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizServiceError {
    #[error("quiz {0} not found")]
    NotFound(QuizId),
    #[error("category {0} not found")]
    UnknownCategory(CategoryId),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuestionBankService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuestionBankError {
    #[error("category {0} not found")]
    UnknownCategory(CategoryId),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `QuizTakingService` and `QuizRun`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizTakingError {
    #[error("quiz {0} not found")]
    QuizNotFound(QuizId),
    #[error("quiz {0} is not published")]
    NotPublished(QuizId),
    #[error("question {index} is out of range")]
    QuestionOutOfRange { index: usize },
    #[error("option {option} is out of range")]
    OptionOutOfRange { option: usize },
    #[error("question {index} was already answered")]
    AlreadyAnswered { index: usize },
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while opening or driving a mock test.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TestSessionError {
    #[error("question bank is empty")]
    EmptyBank,
    #[error("session driver has stopped")]
    DriverClosed,
    #[error(transparent)]
    Storage(#[from] StorageError),
}
