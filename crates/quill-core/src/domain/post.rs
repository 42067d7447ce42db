use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, UserSummary};

/// Post entity - a blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub category_id: Option<i32>,
    /// Optimistic concurrency token, bumped on every update.
    pub version: i32,
}

/// A post that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub author_id: Option<Uuid>,
    pub category_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl NewPost {
    pub fn new(
        author_id: Uuid,
        title: String,
        content: String,
        category_id: Option<i32>,
    ) -> Self {
        Self {
            title,
            content,
            author_id: Some(author_id),
            category_id,
            created_at: Utc::now(),
        }
    }
}

/// Post with its author and category expanded and its likes counted.
#[derive(Debug, Clone)]
pub struct PostDetails {
    pub post: Post,
    pub author: Option<UserSummary>,
    pub category: Option<Category>,
    pub likes_count: u64,
}

/// Listing filter for posts.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    /// Substring matched against title or content.
    pub search: Option<String>,
    pub category_id: Option<i32>,
}

impl PostFilter {
    /// The search term, if it is not blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }

    pub fn matches(&self, post: &Post) -> bool {
        let search_ok = self
            .search_term()
            .is_none_or(|s| post.title.contains(s) || post.content.contains(s));
        let category_ok = self
            .category_id
            .is_none_or(|id| post.category_id == Some(id));
        search_ok && category_ok
    }
}
