use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{Like, LikeDetails, NewLike};
use crate::error::{DomainError, RepoError};
use crate::ports::{LikeRepository, PostRepository};
use crate::validation;

/// Liking and unliking posts.
pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
    posts: Arc<dyn PostRepository>,
}

impl LikeService {
    pub fn new(likes: Arc<dyn LikeRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { likes, posts }
    }

    pub async fn list_for_post(&self, post_id: i32) -> Result<Vec<LikeDetails>, DomainError> {
        Ok(self.likes.list_for_post(post_id).await?)
    }

    pub async fn like(&self, user_id: Uuid, post_id: i32) -> Result<Like, DomainError> {
        validation::validate_post_id(post_id)?;

        let post = self
            .posts
            .find_by_id(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", post_id))?;

        if post.author_id == Some(user_id) {
            return Err(DomainError::Validation(
                "You cannot like your own post".to_string(),
            ));
        }

        if self.likes.find(post_id, user_id).await?.is_some() {
            return Err(already_liked());
        }

        let like = self
            .likes
            .insert(NewLike::new(post_id, user_id))
            .await
            .map_err(|e| match e {
                RepoError::Constraint(_) => already_liked(),
                other => other.into(),
            })?;

        tracing::info!(post_id, user_id = %user_id, "Post liked");
        Ok(like)
    }

    pub async fn unlike(&self, user_id: Uuid, post_id: i32) -> Result<(), DomainError> {
        let like = self
            .likes
            .find(post_id, user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Like", post_id))?;

        match self.likes.delete(like.id).await {
            // Already gone: a concurrent unlike won.
            Ok(()) | Err(RepoError::NotFound) => {}
            Err(other) => return Err(other.into()),
        }

        tracing::info!(post_id, user_id = %user_id, "Post unliked");
        Ok(())
    }

    /// Whether `user_id` has liked `post_id`.
    pub async fn status(&self, user_id: Uuid, post_id: i32) -> Result<bool, DomainError> {
        Ok(self.likes.find(post_id, user_id).await?.is_some())
    }
}

fn already_liked() -> DomainError {
    DomainError::Conflict("You have already liked this post".to_string())
}
