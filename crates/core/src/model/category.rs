use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::CategoryId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CategoryError {
    #[error("category name cannot be empty")]
    EmptyName,
}

/// A grouping of quizzes.
///
/// Names are unique case-insensitively. That rule spans the whole catalog,
/// so it is checked by the category service at write time; this type only
/// provides the comparison key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    name: String,
    description: Option<String>,
}

impl Category {
    /// # Errors
    ///
    /// Returns `CategoryError::EmptyName` if the trimmed name is empty.
    pub fn new(
        id: CategoryId,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Result<Self, CategoryError> {
        let name = name.into().trim().to_owned();
        if name.is_empty() {
            return Err(CategoryError::EmptyName);
        }
        let description = description
            .map(|d| d.trim().to_owned())
            .filter(|d| !d.is_empty());
        Ok(Self {
            id,
            name,
            description,
        })
    }

    #[must_use]
    pub fn id(&self) -> CategoryId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Key used for the case-insensitive uniqueness check.
    #[must_use]
    pub fn name_key(&self) -> String {
        name_key(&self.name)
    }

    #[must_use]
    pub fn with_id(mut self, id: CategoryId) -> Self {
        self.id = id;
        self
    }
}

/// Normalizes a raw category name into its uniqueness key.
#[must_use]
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
