use quiz_core::model::{Question, QuestionId};

use super::SqliteRepository;
use super::mapping::{db_err, id_i64, map_question_row, question_id_from_i64, ser};
use crate::repository::{QuestionRepository, StorageError};

struct QuestionBinds {
    options_json: String,
    correct_option: i64,
    category_id: Option<i64>,
}

fn binds(question: &Question) -> Result<QuestionBinds, StorageError> {
    Ok(QuestionBinds {
        options_json: serde_json::to_string(question.options()).map_err(ser)?,
        correct_option: i64::try_from(question.correct_option()).map_err(ser)?,
        category_id: question
            .category_id()
            .map(|c| id_i64("category_id", c.value()))
            .transpose()?,
    })
}

#[async_trait::async_trait]
impl QuestionRepository for SqliteRepository {
    async fn insert_question(&self, question: &Question) -> Result<QuestionId, StorageError> {
        let b = binds(question)?;

        let res = sqlx::query(
            r"
            INSERT INTO question_bank (
                prompt, options_json, correct_option, explanation, difficulty, category_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ",
        )
        .bind(question.prompt())
        .bind(b.options_json)
        .bind(b.correct_option)
        .bind(question.explanation())
        .bind(question.difficulty().as_str())
        .bind(b.category_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        question_id_from_i64(res.last_insert_rowid())
    }

    async fn upsert_question(&self, question: &Question) -> Result<(), StorageError> {
        let b = binds(question)?;

        sqlx::query(
            r"
            INSERT INTO question_bank (
                id, prompt, options_json, correct_option, explanation, difficulty, category_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(id) DO UPDATE SET
                prompt = excluded.prompt,
                options_json = excluded.options_json,
                correct_option = excluded.correct_option,
                explanation = excluded.explanation,
                difficulty = excluded.difficulty,
                category_id = excluded.category_id
            ",
        )
        .bind(id_i64("question_id", question.id().value())?)
        .bind(question.prompt())
        .bind(b.options_json)
        .bind(b.correct_option)
        .bind(question.explanation())
        .bind(question.difficulty().as_str())
        .bind(b.category_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, StorageError> {
        let row = sqlx::query(
            r"
            SELECT id, prompt, options_json, correct_option, explanation, difficulty, category_id
            FROM question_bank
            WHERE id = ?1
            ",
        )
        .bind(id_i64("question_id", id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn list_questions(&self) -> Result<Vec<Question>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, prompt, options_json, correct_option, explanation, difficulty, category_id
            FROM question_bank
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_question_row).collect()
    }

    async fn delete_question(&self, id: QuestionId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM question_bank WHERE id = ?1")
            .bind(id_i64("question_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
