//! HTTP handlers and route configuration.

mod auth;
mod categories;
mod health;
mod likes;
mod posts;

use actix_web::{HttpRequest, HttpResponse, error, web};

use quill_core::domain::{Category, LikeDetails, PostDetails, UserSummary};
use quill_shared::ErrorResponse;
use quill_shared::dto::{CategoryResponse, LikeResponse, PostResponse, UserResponse};

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error))
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/auth")
                        .route("/register", web::post().to(auth::register))
                        .route("/login", web::post().to(auth::login))
                        .route("/logout", web::post().to(auth::logout))
                        .route("/me", web::get().to(auth::me)),
                )
                .service(
                    web::scope("/posts")
                        .route("", web::get().to(posts::list))
                        .route("", web::post().to(posts::create))
                        .route("/{id}", web::get().to(posts::get))
                        .route("/{id}", web::put().to(posts::update))
                        .route("/{id}", web::delete().to(posts::delete)),
                )
                .service(
                    web::scope("/categories")
                        .route("", web::get().to(categories::list))
                        .route("", web::post().to(categories::create))
                        .route("/{id}", web::get().to(categories::get))
                        .route("/{id}", web::put().to(categories::update))
                        .route("/{id}", web::delete().to(categories::delete)),
                )
                .service(
                    web::scope("/likes")
                        .route("/post/{post_id}", web::get().to(likes::list_for_post))
                        .route("/post/{post_id}", web::post().to(likes::like))
                        .route("/post/{post_id}", web::delete().to(likes::unlike))
                        .route("/post/{post_id}/status", web::get().to(likes::status)),
                ),
        );
}

fn bad_request<E>(err: E) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let body = ErrorResponse::bad_request(err.to_string());
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}

fn json_error(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(err)
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(err)
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    bad_request(err)
}

// Domain -> wire conversions

fn user_response(user: UserSummary) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
    }
}

fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        name: category.name,
        description: category.description,
        created_at: category.created_at,
        version: category.version,
    }
}

fn post_response(details: PostDetails) -> PostResponse {
    let PostDetails {
        post,
        author,
        category,
        likes_count,
    } = details;

    PostResponse {
        id: post.id,
        title: post.title,
        content: post.content,
        created_at: post.created_at,
        updated_at: post.updated_at,
        author_id: post.author_id,
        author: author.map(user_response),
        category_id: post.category_id,
        category: category.map(category_response),
        likes_count,
        version: post.version,
    }
}

fn like_response(details: LikeDetails) -> LikeResponse {
    LikeResponse {
        id: details.like.id,
        post_id: details.like.post_id,
        user_id: details.like.user_id,
        created_at: details.like.created_at,
        user: details.user.map(user_response),
    }
}
