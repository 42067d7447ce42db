//! HTTP-level tests over an in-memory application state.

use std::sync::Arc;

use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use api_server::handlers::configure_routes;
use api_server::state::{AppState, Repositories};
use quill_infra::{Argon2PasswordService, JwtConfig, JwtTokenService};

fn in_memory_state() -> AppState {
    AppState::from_parts(
        Repositories::in_memory(),
        Arc::new(JwtTokenService::new(JwtConfig::default())),
        Arc::new(Argon2PasswordService::with_params(1024, 1, 1).unwrap()),
    )
}

async fn setup_test_app()
-> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(in_memory_state()))
            .configure(configure_routes),
    )
    .await
}

fn bearer(token: &str) -> (header::HeaderName, String) {
    (header::AUTHORIZATION, format!("Bearer {token}"))
}

async fn register<S>(app: &S, username: &str) -> String
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": username, "password": "Secret1!" }))
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    body["token"].as_str().unwrap().to_string()
}

async fn create_post<S>(app: &S, token: &str, body: Value) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(token))
        .set_json(body)
        .to_request();
    test::call_service(app, req).await
}

async fn valid_post<S>(app: &S, token: &str) -> i64
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let resp = create_post(
        app,
        token,
        json!({ "title": "Hello World", "content": "1234567890" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    body["id"].as_i64().unwrap()
}

async fn like<S>(app: &S, token: &str, post_id: i64) -> ServiceResponse
where
    S: Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri(&format!("/api/likes/post/{post_id}"))
        .insert_header(bearer(token))
        .to_request();
    test::call_service(app, req).await
}

#[actix_web::test]
async fn test_health() {
    let app = setup_test_app().await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert!(body["timestamp"].is_string());
}

#[actix_web::test]
async fn test_register_without_digit_is_rejected() {
    let app = setup_test_app().await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "username": "alice", "password": "Secret!!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_register_login_and_me() {
    let app = setup_test_app().await;
    register(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/auth/register")
        .set_json(json!({ "userName": "ALICE", "password": "Secret1!" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "alice", "password": "wrong1!A" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "username": "alice", "password": "Secret1!" }))
        .to_request();
    let login: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(login["tokenType"], "Bearer");
    assert_eq!(login["user"]["email"], "alice@test.com");

    let token = login["token"].as_str().unwrap();
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header(bearer(token))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["username"], "alice");

    let req = test::TestRequest::post()
        .uri("/api/auth/logout")
        .insert_header(bearer(token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_protected_routes_require_token() {
    let app = setup_test_app().await;

    let req = test::TestRequest::get().uri("/api/auth/me").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer("not-a-jwt"))
        .set_json(json!({ "title": "Hello World", "content": "1234567890" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );
}

#[actix_web::test]
async fn test_create_post_validates_and_sets_timestamps() {
    let app = setup_test_app().await;
    let token = register(&app, "alice").await;

    let resp = create_post(&app, &token, json!({ "title": "Hi", "content": "1234567890" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = create_post(
        &app,
        &token,
        json!({ "title": "Hello World", "content": "1234567890" }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let location = resp.headers().get(header::LOCATION).cloned().unwrap();

    let body: Value = test::read_body_json(resp).await;
    assert!(body["createdAt"].is_string());
    assert!(body["updatedAt"].is_null());
    assert_eq!(body["author"]["username"], "alice");
    assert_eq!(body["likesCount"], 0);
    assert_eq!(location.to_str().unwrap(), format!("/api/posts/{}", body["id"]));
}

#[actix_web::test]
async fn test_create_post_with_unknown_category_is_rejected() {
    let app = setup_test_app().await;
    let token = register(&app, "alice").await;

    let resp = create_post(
        &app,
        &token,
        json!({ "title": "Hello World", "content": "1234567890", "categoryId": 42 }),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_list_posts_filters_by_search_and_category() {
    let app = setup_test_app().await;
    let token = register(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "Rust" }))
        .to_request();
    let category: Value = test::call_and_read_body_json(&app, req).await;
    let category_id = category["id"].as_i64().unwrap();

    create_post(
        &app,
        &token,
        json!({ "title": "Ownership explained", "content": "Borrowing rules", "categoryId": category_id }),
    )
    .await;
    create_post(
        &app,
        &token,
        json!({ "title": "Gardening notes", "content": "Tomatoes and basil" }),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/posts?search=Tomatoes")
        .to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["title"], "Gardening notes");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts?categoryId={category_id}"))
        .to_request();
    let found: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["category"]["name"], "Rust");

    let req = test::TestRequest::get().uri("/api/posts?search=").to_request();
    let all: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    // Newest first.
    assert_eq!(all[0]["title"], "Gardening notes");
}

#[actix_web::test]
async fn test_update_post() {
    let app = setup_test_app().await;
    let token = register(&app, "alice").await;
    let id = valid_post(&app, &token).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "id": id + 1, "title": "Hello Again", "content": "0987654321" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "id": id, "title": "Hello Again", "content": "0987654321", "version": 1 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["title"], "Hello Again");
    assert_eq!(post["version"], 2);
    assert!(post["updatedAt"].is_string());

    // Version 1 was consumed by the previous update.
    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&token))
        .set_json(json!({ "id": id, "title": "Lost Update", "content": "0987654321", "version": 1 }))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::CONFLICT
    );
}

#[actix_web::test]
async fn test_missing_post_is_not_found() {
    let app = setup_test_app().await;
    let token = register(&app, "alice").await;

    let req = test::TestRequest::get().uri("/api/posts/999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Not Found");

    let req = test::TestRequest::delete()
        .uri("/api/posts/999")
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_like_rules() {
    let app = setup_test_app().await;
    let author = register(&app, "alice").await;
    let reader = register(&app, "bob").await;
    let id = valid_post(&app, &author).await;

    assert_eq!(like(&app, &author, id).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(like(&app, &reader, id).await.status(), StatusCode::OK);
    assert_eq!(like(&app, &reader, id).await.status(), StatusCode::CONFLICT);
    assert_eq!(like(&app, &reader, 0).await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(like(&app, &reader, 999).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&format!("/api/likes/post/{id}/status"))
        .insert_header(bearer(&reader))
        .to_request();
    let status: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(status["hasLiked"], true);

    let req = test::TestRequest::get()
        .uri(&format!("/api/likes/post/{id}"))
        .to_request();
    let likes: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(likes[0]["user"]["username"], "bob");

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{id}"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["likesCount"], 1);

    let unlike = || {
        test::TestRequest::delete()
            .uri(&format!("/api/likes/post/{id}"))
            .insert_header(bearer(&reader))
            .to_request()
    };
    assert_eq!(
        test::call_service(&app, unlike()).await.status(),
        StatusCode::OK
    );
    assert_eq!(
        test::call_service(&app, unlike()).await.status(),
        StatusCode::NOT_FOUND
    );
}

#[actix_web::test]
async fn test_deleting_post_removes_likes() {
    let app = setup_test_app().await;
    let author = register(&app, "alice").await;
    let reader = register(&app, "bob").await;
    let id = valid_post(&app, &author).await;
    like(&app, &reader, id).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/posts/{id}"))
        .insert_header(bearer(&author))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/likes/post/{id}"))
        .to_request();
    let likes: Value = test::call_and_read_body_json(&app, req).await;
    assert!(likes.as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_category_names_are_unique_ignoring_case() {
    let app = setup_test_app().await;
    let token = register(&app, "alice").await;

    let create = |name: &str| {
        test::TestRequest::post()
            .uri("/api/categories")
            .insert_header(bearer(&token))
            .set_json(json!({ "name": name, "description": "All things tech" }))
            .to_request()
    };

    let resp = test::call_service(&app, create("tech")).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.headers().contains_key(header::LOCATION));

    assert_eq!(
        test::call_service(&app, create("Tech")).await.status(),
        StatusCode::CONFLICT
    );
}

#[actix_web::test]
async fn test_deleting_category_detaches_posts() {
    let app = setup_test_app().await;
    let token = register(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .insert_header(bearer(&token))
        .set_json(json!({ "name": "News" }))
        .to_request();
    let category: Value = test::call_and_read_body_json(&app, req).await;
    let category_id = category["id"].as_i64().unwrap();

    let resp = create_post(
        &app,
        &token,
        json!({ "title": "Hello World", "content": "1234567890", "categoryId": category_id }),
    )
    .await;
    let post: Value = test::read_body_json(resp).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/categories/{category_id}"))
        .insert_header(bearer(&token))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::NO_CONTENT
    );

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{}", post["id"]))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert!(post["categoryId"].is_null());
    assert!(post["category"].is_null());
}

#[actix_web::test]
async fn test_malformed_input_is_bad_request() {
    let app = setup_test_app().await;
    let token = register(&app, "alice").await;

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .insert_header(bearer(&token))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "Bad Request");

    let req = test::TestRequest::get().uri("/api/posts/abc").to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );

    let req = test::TestRequest::get()
        .uri("/api/posts?categoryId=abc")
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::BAD_REQUEST
    );
}
