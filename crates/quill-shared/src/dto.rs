//! Data Transfer Objects - request/response types for the API.
//!
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[serde(alias = "userName")]
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(alias = "userName")]
    pub username: String,
    pub password: String,
}

/// A user's public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

/// Issued token plus the profile it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Query string of `GET /api/posts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostQuery {
    pub search: Option<String>,
    pub category_id: Option<i32>,
}

/// Body of `POST /api/posts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category_id: Option<i32>,
}

/// Body of `PUT /api/posts/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    pub id: i32,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category_id: Option<i32>,
    /// Version last read by the client; enables lost-update detection.
    #[serde(default)]
    pub version: Option<i32>,
}

/// Category as embedded in, or listed next to, posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub version: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub author_id: Option<Uuid>,
    pub author: Option<UserResponse>,
    pub category_id: Option<i32>,
    pub category: Option<CategoryResponse>,
    pub likes_count: u64,
    pub version: i32,
}

/// Body of `POST /api/categories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of `PUT /api/categories/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    pub id: i32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeResponse {
    pub id: i32,
    pub post_id: i32,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub user: Option<UserResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatusResponse {
    pub has_liked: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_accepts_user_name_alias() {
        let req: RegisterRequest =
            serde_json::from_str(r#"{"userName":"alice","password":"Secret1!"}"#).unwrap();
        assert_eq!(req.username, "alice");
        assert!(req.email.is_none());
    }

    #[test]
    fn post_query_uses_camel_case() {
        let query: PostQuery = serde_json::from_str(r#"{"categoryId":3}"#).unwrap();
        assert_eq!(query.category_id, Some(3));
        assert!(query.search.is_none());
    }

    #[test]
    fn null_updated_at_is_serialized() {
        let post = PostResponse {
            id: 1,
            title: "Hello World".into(),
            content: "1234567890".into(),
            created_at: Utc::now(),
            updated_at: None,
            author_id: None,
            author: None,
            category_id: None,
            category: None,
            likes_count: 0,
            version: 1,
        };
        let json = serde_json::to_value(&post).unwrap();
        assert!(json["updatedAt"].is_null());
        assert_eq!(json["likesCount"], 0);
    }
}
