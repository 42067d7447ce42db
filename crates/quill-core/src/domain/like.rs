use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserSummary;

/// Like entity - one user liking one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Like {
    pub id: i32,
    pub post_id: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A like that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewLike {
    pub post_id: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl NewLike {
    pub fn new(post_id: i32, user_id: Uuid) -> Self {
        Self {
            post_id,
            user_id,
            created_at: Utc::now(),
        }
    }
}

/// Like with the liking user expanded.
#[derive(Debug, Clone)]
pub struct LikeDetails {
    pub like: Like,
    pub user: Option<UserSummary>,
}
