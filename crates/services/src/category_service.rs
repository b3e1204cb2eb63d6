use std::sync::Arc;

use quiz_core::model::{Category, CategoryId, name_key};
use storage::repository::{CategoryRepository, QuizRepository};
use tracing::info;

use crate::error::CategoryServiceError;

/// Admin operations on categories.
#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    quizzes: Arc<dyn QuizRepository>,
}

impl CategoryService {
    #[must_use]
    pub fn new(categories: Arc<dyn CategoryRepository>, quizzes: Arc<dyn QuizRepository>) -> Self {
        Self {
            categories,
            quizzes,
        }
    }

    /// Create a category with a name unique across the catalog.
    ///
    /// # Errors
    ///
    /// Returns `CategoryServiceError::DuplicateName` if another category has
    /// the same name ignoring case, `CategoryServiceError::Category` for
    /// validation failures, or `CategoryServiceError::Storage`.
    pub async fn create_category(
        &self,
        name: &str,
        description: Option<String>,
    ) -> Result<CategoryId, CategoryServiceError> {
        let category = Category::new(CategoryId::new(0), name, description)?;
        self.ensure_unique(&category, None).await?;
        let id = self.categories.insert_category(&category).await?;
        info!(category_id = %id, name = category.name(), "category created");
        Ok(id)
    }

    /// Change name and description.
    ///
    /// # Errors
    ///
    /// Returns `CategoryServiceError::NotFound`, `DuplicateName`, validation or
    /// storage errors.
    pub async fn update_category(
        &self,
        id: CategoryId,
        name: &str,
        description: Option<String>,
    ) -> Result<(), CategoryServiceError> {
        if self.categories.get_category(id).await?.is_none() {
            return Err(CategoryServiceError::NotFound(id));
        }
        let updated = Category::new(id, name, description)?;
        self.ensure_unique(&updated, Some(id)).await?;
        self.categories.upsert_category(&updated).await?;
        Ok(())
    }

    /// Delete a category that no quiz references.
    ///
    /// # Errors
    ///
    /// Returns `CategoryServiceError::InUse` while quizzes point at it,
    /// `CategoryServiceError::NotFound` if it does not exist.
    pub async fn delete_category(&self, id: CategoryId) -> Result<(), CategoryServiceError> {
        if self.categories.get_category(id).await?.is_none() {
            return Err(CategoryServiceError::NotFound(id));
        }
        if !self.quizzes.list_quizzes(Some(id)).await?.is_empty() {
            return Err(CategoryServiceError::InUse(id));
        }
        self.categories.delete_category(id).await?;
        info!(category_id = %id, "category deleted");
        Ok(())
    }

    /// All categories ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `CategoryServiceError::Storage` if repository access fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, CategoryServiceError> {
        Ok(self.categories.list_categories().await?)
    }

    /// # Errors
    ///
    /// Returns `CategoryServiceError::Storage` if repository access fails.
    pub async fn get_category(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, CategoryServiceError> {
        Ok(self.categories.get_category(id).await?)
    }

    async fn ensure_unique(
        &self,
        candidate: &Category,
        except: Option<CategoryId>,
    ) -> Result<(), CategoryServiceError> {
        let key = candidate.name_key();
        let clash = self
            .categories
            .list_categories()
            .await?
            .into_iter()
            .any(|c| Some(c.id()) != except && name_key(c.name()) == key);
        if clash {
            return Err(CategoryServiceError::DuplicateName(candidate.name().to_owned()));
        }
        Ok(())
    }
}
