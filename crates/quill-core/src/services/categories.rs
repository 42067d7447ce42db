use std::sync::Arc;

use crate::domain::{Category, NewCategory};
use crate::error::{DomainError, RepoError};
use crate::ports::CategoryRepository;
use crate::validation::{self, CategoryInput};

use super::not_found_as;

/// Body of a category update.
#[derive(Debug, Clone)]
pub struct CategoryUpdate {
    pub id: i32,
    pub input: CategoryInput,
    pub version: Option<i32>,
}

/// Category CRUD.
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>) -> Self {
        Self { categories }
    }

    pub async fn list(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list().await?)
    }

    pub async fn get(&self, id: i32) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Category", id))
    }

    pub async fn create(&self, input: CategoryInput) -> Result<Category, DomainError> {
        validation::check(&input)?;

        if self.categories.find_by_name(&input.name).await?.is_some() {
            return Err(duplicate_name());
        }

        let category = self
            .categories
            .insert(NewCategory::new(input.name, input.description))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => duplicate_name(),
                other => other.into(),
            })?;

        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    pub async fn update(&self, id: i32, update: CategoryUpdate) -> Result<Category, DomainError> {
        if update.id != id {
            return Err(DomainError::BadRequest(format!(
                "Path id {} does not match body id {}",
                id, update.id
            )));
        }
        validation::check(&update.input)?;

        let mut category = self.get(id).await?;

        if let Some(existing) = self.categories.find_by_name(&update.input.name).await? {
            if existing.id != id {
                return Err(duplicate_name());
            }
        }

        category.name = update.input.name;
        category.description = update.input.description;
        if let Some(version) = update.version {
            category.version = version;
        }

        let category = self
            .categories
            .update(category)
            .await
            .map_err(|e| match e {
                RepoError::Stale(_) => DomainError::Conflict(
                    "Category was modified by another request; reload it and retry".to_string(),
                ),
                RepoError::Constraint(_) => duplicate_name(),
                other => not_found_as("Category", id)(other),
            })?;

        tracing::info!(category_id = id, version = category.version, "Category updated");
        Ok(category)
    }

    /// Delete a category; its posts stay, uncategorized.
    pub async fn delete(&self, id: i32) -> Result<(), DomainError> {
        self.categories
            .delete(id)
            .await
            .map_err(not_found_as("Category", id))?;
        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}

fn duplicate_name() -> DomainError {
    DomainError::Conflict("Category with this name already exists".to_string())
}
