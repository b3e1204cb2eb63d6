use std::str::FromStr;

use quiz_core::model::{
    AttemptId, Category, CategoryId, Difficulty, OPTION_COUNT, Question, QuestionId, Quiz,
    QuizAttempt, QuizId, UserId,
};
use sqlx::Row;
use sqlx::error::ErrorKind;
use sqlx::sqlite::SqliteRow;

use crate::repository::{AttemptRow, StorageError};

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

/// Constraint violations become `Conflict`; everything else is a
/// connection-level failure.
pub(crate) fn db_err(e: sqlx::Error) -> StorageError {
    if let Some(db) = e.as_database_error() {
        if matches!(
            db.kind(),
            ErrorKind::ForeignKeyViolation | ErrorKind::UniqueViolation | ErrorKind::CheckViolation
        ) {
            return StorageError::Conflict;
        }
    }
    StorageError::Connection(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn category_id_from_i64(v: i64) -> Result<CategoryId, StorageError> {
    Ok(CategoryId::new(i64_to_u64("category_id", v)?))
}

pub(crate) fn quiz_id_from_i64(v: i64) -> Result<QuizId, StorageError> {
    Ok(QuizId::new(i64_to_u64("quiz_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

pub(crate) fn attempt_id_from_i64(v: i64) -> Result<AttemptId, StorageError> {
    Ok(AttemptId::new(i64_to_u64("attempt_id", v)?))
}

pub(crate) fn map_category_row(row: &SqliteRow) -> Result<Category, StorageError> {
    Category::new(
        category_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_quiz_row(row: &SqliteRow) -> Result<Quiz, StorageError> {
    let questions_json: String = row.try_get("questions_json").map_err(ser)?;
    let questions: Vec<Question> = serde_json::from_str(&questions_json).map_err(ser)?;
    let time_limit_minutes = row
        .try_get::<Option<i64>, _>("time_limit_minutes")
        .map_err(ser)?
        .map(|m| u32_from_i64("time_limit_minutes", m))
        .transpose()?;

    Quiz::from_persisted(
        quiz_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get("title").map_err(ser)?,
        row.try_get("description").map_err(ser)?,
        category_id_from_i64(row.try_get::<i64, _>("category_id").map_err(ser)?)?,
        questions,
        time_limit_minutes,
        row.try_get::<bool, _>("published").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<Question, StorageError> {
    let options_json: String = row.try_get("options_json").map_err(ser)?;
    let options: [String; OPTION_COUNT] = serde_json::from_str(&options_json).map_err(ser)?;
    let correct_option = usize::try_from(row.try_get::<i64, _>("correct_option").map_err(ser)?)
        .map_err(ser)?;
    let difficulty_str: String = row.try_get("difficulty").map_err(ser)?;
    let difficulty = Difficulty::from_str(&difficulty_str).map_err(ser)?;
    let category_id = row
        .try_get::<Option<i64>, _>("category_id")
        .map_err(ser)?
        .map(category_id_from_i64)
        .transpose()?;

    Question::from_persisted(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get("prompt").map_err(ser)?,
        options,
        correct_option,
        row.try_get("explanation").map_err(ser)?,
        difficulty,
        category_id,
    )
    .map_err(ser)
}

pub(crate) fn map_attempt_row(row: &SqliteRow) -> Result<QuizAttempt, StorageError> {
    let user_id_str: String = row.try_get("user_id").map_err(ser)?;
    let user_id = UserId::from_str(&user_id_str).map_err(ser)?;
    let time_taken = row.try_get::<i64, _>("time_taken_secs").map_err(ser)?;

    QuizAttempt::from_persisted(
        user_id,
        quiz_id_from_i64(row.try_get::<i64, _>("quiz_id").map_err(ser)?)?,
        u32_from_i64("correct", row.try_get::<i64, _>("correct").map_err(ser)?)?,
        u32_from_i64("incorrect", row.try_get::<i64, _>("incorrect").map_err(ser)?)?,
        u32_from_i64("skipped", row.try_get::<i64, _>("skipped").map_err(ser)?)?,
        u32_from_i64("total", row.try_get::<i64, _>("total").map_err(ser)?)?,
        i64_to_u64("time_taken_secs", time_taken)?,
        row.try_get::<bool, _>("exceeded_time_limit").map_err(ser)?,
        row.try_get("completed_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_attempt_row_with_id(row: &SqliteRow) -> Result<AttemptRow, StorageError> {
    let id = attempt_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?;
    Ok(AttemptRow::new(id, map_attempt_row(row)?))
}
