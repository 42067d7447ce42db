//! Like handlers.

use actix_web::{HttpResponse, web};

use quill_shared::MessageResponse;
use quill_shared::dto::{LikeResponse, LikeStatusResponse};

use super::like_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/likes/post/{post_id}
pub async fn list_for_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let likes: Vec<LikeResponse> = state
        .likes
        .list_for_post(path.into_inner())
        .await?
        .into_iter()
        .map(like_response)
        .collect();

    Ok(HttpResponse::Ok().json(likes))
}

/// POST /api/likes/post/{post_id}
pub async fn like(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state.likes.like(identity.user_id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post liked successfully")))
}

/// DELETE /api/likes/post/{post_id}
pub async fn unlike(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state
        .likes
        .unlike(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Post unliked successfully")))
}

/// GET /api/likes/post/{post_id}/status
pub async fn status(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let has_liked = state
        .likes
        .status(identity.user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(LikeStatusResponse { has_liked }))
}
