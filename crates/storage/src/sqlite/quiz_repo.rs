use quiz_core::model::{CategoryId, Quiz, QuizId};

use super::SqliteRepository;
use super::mapping::{db_err, id_i64, map_quiz_row, quiz_id_from_i64, ser};
use crate::repository::{QuizRepository, StorageError};

const QUIZ_COLUMNS: &str = "id, title, description, category_id, questions_json, \
                            time_limit_minutes, published, created_at";

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn insert_quiz(&self, quiz: &Quiz) -> Result<QuizId, StorageError> {
        let questions_json = serde_json::to_string(quiz.questions()).map_err(ser)?;

        let res = sqlx::query(
            r"
            INSERT INTO quizzes (
                title, description, category_id, questions_json,
                time_limit_minutes, published, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ",
        )
        .bind(quiz.title())
        .bind(quiz.description())
        .bind(id_i64("category_id", quiz.category_id().value())?)
        .bind(questions_json)
        .bind(quiz.time_limit_minutes().map(i64::from))
        .bind(quiz.is_published())
        .bind(quiz.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        quiz_id_from_i64(res.last_insert_rowid())
    }

    async fn upsert_quiz(&self, quiz: &Quiz) -> Result<(), StorageError> {
        let questions_json = serde_json::to_string(quiz.questions()).map_err(ser)?;

        sqlx::query(
            r"
            INSERT INTO quizzes (
                id, title, description, category_id, questions_json,
                time_limit_minutes, published, created_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT(id) DO UPDATE SET
                title = excluded.title,
                description = excluded.description,
                category_id = excluded.category_id,
                questions_json = excluded.questions_json,
                time_limit_minutes = excluded.time_limit_minutes,
                published = excluded.published
            ",
        )
        .bind(id_i64("quiz_id", quiz.id().value())?)
        .bind(quiz.title())
        .bind(quiz.description())
        .bind(id_i64("category_id", quiz.category_id().value())?)
        .bind(questions_json)
        .bind(quiz.time_limit_minutes().map(i64::from))
        .bind(quiz.is_published())
        .bind(quiz.created_at())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_quiz(&self, id: QuizId) -> Result<Option<Quiz>, StorageError> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE id = ?1");
        let row = sqlx::query(&sql)
            .bind(id_i64("quiz_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_quiz_row).transpose()
    }

    async fn list_quizzes(&self, category: Option<CategoryId>) -> Result<Vec<Quiz>, StorageError> {
        let rows = match category {
            Some(category) => {
                let sql = format!(
                    "SELECT {QUIZ_COLUMNS} FROM quizzes WHERE category_id = ?1 ORDER BY id ASC"
                );
                sqlx::query(&sql)
                    .bind(id_i64("category_id", category.value())?)
                    .fetch_all(&self.pool)
                    .await
            }
            None => {
                let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes ORDER BY id ASC");
                sqlx::query(&sql).fetch_all(&self.pool).await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(map_quiz_row).collect()
    }

    async fn list_published_quizzes(&self) -> Result<Vec<Quiz>, StorageError> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes WHERE published = 1 ORDER BY id ASC");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        rows.iter().map(map_quiz_row).collect()
    }

    async fn delete_quiz(&self, id: QuizId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM quizzes WHERE id = ?1")
            .bind(id_i64("quiz_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
