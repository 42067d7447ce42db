//! Authentication handlers.

use actix_web::{HttpResponse, web};

use quill_core::services::Session;
use quill_core::validation::Credentials;
use quill_shared::MessageResponse;
use quill_shared::dto::{AuthResponse, LoginRequest, RegisterRequest};

use super::user_response;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn auth_response(session: Session) -> AuthResponse {
    AuthResponse {
        token: session.token,
        token_type: "Bearer".to_string(),
        expires_in: session.expires_in.max(0) as u64,
        user: user_response(session.user.summary()),
    }
}

/// POST /api/auth/register
pub async fn register(
    state: web::Data<AppState>,
    body: web::Json<RegisterRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let credentials = Credentials {
        username: req.username,
        password: req.password,
    };
    let session = state.auth.register(credentials, req.email).await?;

    Ok(HttpResponse::Ok().json(auth_response(session)))
}

/// POST /api/auth/login
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    let session = state.auth.login(&req.username, &req.password).await?;

    Ok(HttpResponse::Ok().json(auth_response(session)))
}

/// POST /api/auth/logout - Protected route
pub async fn logout(state: web::Data<AppState>, identity: Identity) -> HttpResponse {
    state.auth.logout(identity.user_id);
    HttpResponse::Ok().json(MessageResponse::new("Logged out successfully"))
}

/// GET /api/auth/me - Protected route
pub async fn me(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let user = state.auth.current_user(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(user_response(user.summary())))
}
