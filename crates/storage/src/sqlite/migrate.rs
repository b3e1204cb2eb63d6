use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
        CREATE TABLE IF NOT EXISTS categories (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS quizzes (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT NOT NULL,
            category_id INTEGER NOT NULL,
            questions_json TEXT NOT NULL,
            time_limit_minutes INTEGER CHECK (time_limit_minutes > 0),
            published INTEGER NOT NULL CHECK (published IN (0, 1)),
            created_at TEXT NOT NULL,
            FOREIGN KEY (category_id) REFERENCES categories(id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS question_bank (
            id INTEGER PRIMARY KEY,
            prompt TEXT NOT NULL,
            options_json TEXT NOT NULL,
            correct_option INTEGER NOT NULL CHECK (correct_option BETWEEN 0 AND 3),
            explanation TEXT NOT NULL,
            difficulty TEXT NOT NULL CHECK (difficulty IN ('easy', 'medium', 'hard')),
            category_id INTEGER,
            FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS quiz_attempts (
            id INTEGER PRIMARY KEY,
            user_id TEXT NOT NULL,
            quiz_id INTEGER NOT NULL,
            correct INTEGER NOT NULL CHECK (correct >= 0),
            incorrect INTEGER NOT NULL CHECK (incorrect >= 0),
            skipped INTEGER NOT NULL CHECK (skipped >= 0),
            total INTEGER NOT NULL CHECK (total > 0),
            time_taken_secs INTEGER NOT NULL CHECK (time_taken_secs >= 0),
            exceeded_time_limit INTEGER NOT NULL CHECK (exceeded_time_limit IN (0, 1)),
            completed_at TEXT NOT NULL
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_quizzes_category
            ON quizzes (category_id, id);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_quiz_attempts_user_completed
            ON quiz_attempts (user_id, completed_at);
    ",
];

/// Runs versioned migrations, recording each applied version.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        for statement in SCHEMA_V1 {
            sqlx::query(statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(version = 1, "applied schema migration");
    }

    Ok(())
}
