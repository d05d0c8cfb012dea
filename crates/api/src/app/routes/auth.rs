use std::sync::Arc;

use axum::{
    Router,
    extract::Extension,
    http::StatusCode,
    response::Response,
    routing::{get, post},
};
use chrono::Utc;

use roomshare_auth::{NewUser, User};

use crate::app::dto::{AuthPayload, LoginRequest, UserPayload, ValidJson};
use crate::app::errors::{self, ApiError};
use crate::app::routes::require_principal;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/logout", post(logout))
}

fn issue_token(services: &AppServices, user: &User) -> Result<String, ApiError> {
    Ok(services.sessions.issue(user.id, Utc::now())?.token)
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(body): ValidJson<NewUser>,
) -> Result<Response, ApiError> {
    let user = services.credentials.register(body, Utc::now()).await?;
    let token = issue_token(&services, &user)?;

    Ok(errors::success(
        StatusCode::CREATED,
        "User registered successfully",
        AuthPayload::new(user, token),
    ))
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ValidJson(body): ValidJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let (Some(email), Some(password)) = (body.email, body.password) else {
        return Err(ApiError::bad_request("Email and password are required"));
    };
    if email.trim().is_empty() || password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let user = services.credentials.verify(&email, &password, Utc::now()).await?;
    let token = issue_token(&services, &user)?;

    Ok(errors::success(StatusCode::OK, "Login successful", AuthPayload::new(user, token)))
}

pub async fn me(principal: Option<Extension<PrincipalContext>>) -> Result<Response, ApiError> {
    let principal = require_principal(principal)?;
    Ok(errors::success(
        StatusCode::OK,
        "User data retrieved successfully",
        UserPayload::new(principal.user().clone()),
    ))
}

/// Tokens are stateless; the client discards its copy.
pub async fn logout(principal: Option<Extension<PrincipalContext>>) -> Result<Response, ApiError> {
    let principal = require_principal(principal)?;
    tracing::info!(user_id = %principal.user().id, "logout");
    Ok(errors::success(StatusCode::OK, "Logged out successfully", ()))
}
