use quiz_core::model::{Category, CategoryId};

use super::SqliteRepository;
use super::mapping::{category_id_from_i64, db_err, id_i64, map_category_row};
use crate::repository::{CategoryRepository, StorageError};

#[async_trait::async_trait]
impl CategoryRepository for SqliteRepository {
    async fn insert_category(&self, category: &Category) -> Result<CategoryId, StorageError> {
        let res = sqlx::query(
            r"
            INSERT INTO categories (name, description)
            VALUES (?1, ?2)
            ",
        )
        .bind(category.name())
        .bind(category.description())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        category_id_from_i64(res.last_insert_rowid())
    }

    async fn upsert_category(&self, category: &Category) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO categories (id, name, description)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                description = excluded.description
            ",
        )
        .bind(id_i64("category_id", category.id().value())?)
        .bind(category.name())
        .bind(category.description())
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StorageError> {
        let row = sqlx::query("SELECT id, name, description FROM categories WHERE id = ?1")
            .bind(id_i64("category_id", id.value())?)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        row.as_ref().map(map_category_row).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description
            FROM categories
            ORDER BY lower(name) ASC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter().map(map_category_row).collect()
    }

    async fn delete_category(&self, id: CategoryId) -> Result<(), StorageError> {
        let res = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id_i64("category_id", id.value())?)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if res.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }
}
