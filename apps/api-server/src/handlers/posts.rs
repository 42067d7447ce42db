//! Post handlers.

use actix_web::{HttpResponse, http::header, web};

use quill_core::domain::PostFilter;
use quill_core::services::PostUpdate;
use quill_core::validation::PostInput;
use quill_shared::dto::{CreatePostRequest, PostQuery, PostResponse, UpdatePostRequest};

use super::post_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/posts?search=&categoryId=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PostQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = PostFilter {
        search: query.search,
        category_id: query.category_id,
    };

    let posts: Vec<PostResponse> = state
        .posts
        .list(&filter)
        .await?
        .into_iter()
        .map(post_response)
        .collect();

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let post = state.posts.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let input = PostInput {
        title: req.title,
        content: req.content,
        category_id: req.category_id,
    };

    let post = state.posts.create(identity.user_id, input).await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/posts/{}", post.post.id)))
        .json(post_response(post)))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i32>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let update = PostUpdate {
        id: req.id,
        input: PostInput {
            title: req.title,
            content: req.content,
            category_id: req.category_id,
        },
        version: req.version,
    };

    state.posts.update(path.into_inner(), update).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state.posts.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
