use quiz_core::model::{AttemptId, QuizAttempt, UserId};

use super::SqliteRepository;
use super::mapping::{attempt_id_from_i64, db_err, id_i64, map_attempt_row, map_attempt_row_with_id};
use crate::repository::{AttemptRepository, AttemptRow, StorageError};

#[async_trait::async_trait]
impl AttemptRepository for SqliteRepository {
    async fn append_attempt(&self, attempt: &QuizAttempt) -> Result<AttemptId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO quiz_attempts (
                    user_id, quiz_id, correct, incorrect, skipped, total,
                    time_taken_secs, exceeded_time_limit, completed_at
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ",
        )
        .bind(attempt.user_id().to_string())
        .bind(id_i64("quiz_id", attempt.quiz_id().value())?)
        .bind(i64::from(attempt.correct()))
        .bind(i64::from(attempt.incorrect()))
        .bind(i64::from(attempt.skipped()))
        .bind(i64::from(attempt.total()))
        .bind(id_i64("time_taken_secs", attempt.time_taken_secs())?)
        .bind(attempt.exceeded_time_limit())
        .bind(attempt.completed_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        attempt_id_from_i64(res.last_insert_rowid())
    }

    async fn get_attempt(&self, id: AttemptId) -> Result<Option<QuizAttempt>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT
                    user_id, quiz_id, correct, incorrect, skipped, total,
                    time_taken_secs, exceeded_time_limit, completed_at
                FROM quiz_attempts
                WHERE id = ?1
            ",
        )
        .bind(id_i64("attempt_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_attempt_row).transpose()
    }

    async fn list_attempts(
        &self,
        user: UserId,
        limit: u32,
    ) -> Result<Vec<AttemptRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT
                    id, user_id, quiz_id, correct, incorrect, skipped, total,
                    time_taken_secs, exceeded_time_limit, completed_at
                FROM quiz_attempts
                WHERE user_id = ?1
                ORDER BY completed_at DESC, id DESC
                LIMIT ?2
            ",
        )
        .bind(user.to_string())
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_attempt_row_with_id).collect()
    }
}
