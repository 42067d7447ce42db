//! Category handlers.

use actix_web::{HttpResponse, http::header, web};

use quill_core::services::CategoryUpdate;
use quill_core::validation::CategoryInput;
use quill_shared::dto::{CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};

use super::category_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/categories
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories: Vec<CategoryResponse> = state
        .categories
        .list()
        .await?
        .into_iter()
        .map(category_response)
        .collect();

    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/categories/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let category = state.categories.get(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(category_response(category)))
}

/// POST /api/categories
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let category = state
        .categories
        .create(CategoryInput {
            name: req.name,
            description: req.description,
        })
        .await?;

    Ok(HttpResponse::Created()
        .insert_header((header::LOCATION, format!("/api/categories/{}", category.id)))
        .json(category_response(category)))
}

/// PUT /api/categories/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i32>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let update = CategoryUpdate {
        id: req.id,
        input: CategoryInput {
            name: req.name,
            description: req.description,
        },
        version: req.version,
    };

    state.categories.update(path.into_inner(), update).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// DELETE /api/categories/{id}
pub async fn delete(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    state.categories.delete(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
