use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{NewPost, PostDetails, PostFilter};
use crate::error::{DomainError, RepoError};
use crate::ports::{CategoryRepository, PostRepository};
use crate::validation::{self, PostInput};

use super::not_found_as;

/// Body of a post update.
#[derive(Debug, Clone)]
pub struct PostUpdate {
    /// Must equal the id addressed by the request.
    pub id: i32,
    pub input: PostInput,
    /// Version the caller last saw; the currently stored one when absent.
    pub version: Option<i32>,
}

/// Post listing and CRUD.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl PostService {
    pub fn new(posts: Arc<dyn PostRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { posts, categories }
    }

    pub async fn list(&self, filter: &PostFilter) -> Result<Vec<PostDetails>, DomainError> {
        Ok(self.posts.list(filter).await?)
    }

    pub async fn get(&self, id: i32) -> Result<PostDetails, DomainError> {
        self.posts
            .find_details(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))
    }

    pub async fn create(
        &self,
        author_id: Uuid,
        input: PostInput,
    ) -> Result<PostDetails, DomainError> {
        validation::check(&input)?;
        self.ensure_category(input.category_id).await?;

        let post = self
            .posts
            .insert(NewPost::new(
                author_id,
                input.title,
                input.content,
                input.category_id,
            ))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => missing_category(input.category_id),
                other => other.into(),
            })?;

        tracing::info!(post_id = post.id, author_id = %author_id, "Post created");
        self.get(post.id).await
    }

    pub async fn update(&self, id: i32, update: PostUpdate) -> Result<PostDetails, DomainError> {
        if update.id != id {
            return Err(DomainError::BadRequest(format!(
                "Path id {} does not match body id {}",
                id, update.id
            )));
        }
        validation::check(&update.input)?;

        let mut post = self
            .posts
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", id))?;
        self.ensure_category(update.input.category_id).await?;

        post.title = update.input.title;
        post.content = update.input.content;
        post.category_id = update.input.category_id;
        post.updated_at = Some(Utc::now());
        if let Some(version) = update.version {
            post.version = version;
        }

        let category_id = post.category_id;
        let post = self.posts.update(post).await.map_err(|e| match e {
            RepoError::Stale(_) => {
                tracing::warn!(post_id = id, "Concurrent post modification rejected");
                DomainError::Conflict(
                    "Post was modified by another request; reload it and retry".to_string(),
                )
            }
            RepoError::Constraint(_) => missing_category(category_id),
            other => not_found_as("Post", id)(other),
        })?;

        tracing::info!(post_id = id, version = post.version, "Post updated");
        self.get(id).await
    }

    /// Delete a post together with its likes.
    pub async fn delete(&self, id: i32) -> Result<(), DomainError> {
        self.posts.delete(id).await.map_err(not_found_as("Post", id))?;
        tracing::info!(post_id = id, "Post deleted");
        Ok(())
    }

    async fn ensure_category(&self, category_id: Option<i32>) -> Result<(), DomainError> {
        let Some(category_id) = category_id else {
            return Ok(());
        };
        if self.categories.find_by_id(category_id).await?.is_none() {
            return Err(missing_category(Some(category_id)));
        }
        Ok(())
    }
}

/// The only constraint a post write can trip is the category foreign key,
/// when the category disappears between the existence check and the write.
fn missing_category(category_id: Option<i32>) -> DomainError {
    match category_id {
        Some(id) => DomainError::Validation(format!("Category {} does not exist", id)),
        None => DomainError::Validation("Category does not exist".to_string()),
    }
}
