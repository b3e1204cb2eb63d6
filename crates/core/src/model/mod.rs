mod answer;
mod attempt;
mod category;
mod ids;
mod question;
mod quiz;
mod settings;
pub mod snapshot;

pub use ids::{AttemptId, CategoryId, ParseIdError, QuestionId, QuizId, UserId};

pub use answer::{AnswerState, UserAnswer};
pub use attempt::{AttemptError, QuizAttempt};
pub use category::{Category, CategoryError, name_key};
pub use question::{
    Difficulty, OPTION_COUNT, Question, QuestionDraft, QuestionError, ValidatedQuestion,
};
pub use quiz::{Quiz, QuizError};
pub use settings::{SettingsError, TestSettings};
pub use snapshot::{SessionSnapshot, SnapshotAnswer, SnapshotError};
