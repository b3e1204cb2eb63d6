use thiserror::Error;

use crate::model::{
    AttemptError, CategoryError, QuestionError, QuizError, SettingsError, SnapshotError,
};

/// Umbrella error for callers that do not care which entity failed validation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error(transparent)]
    Attempt(#[from] AttemptError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}
