//! Response envelope and error mapping.
//!
//! Every response body has the shape
//! `{success, message, data?, errors?, timestamp}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

use roomshare_auth::{AuthzError, SessionError};
use roomshare_core::{DomainError, ValidationErrors};
use roomshare_infra::{CredentialError, StoreError};

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Successful envelope. `data` is omitted when it serializes to `null`.
pub fn success(status: StatusCode, message: &str, data: impl Serialize) -> Response {
    let mut body = json!({
        "success": true,
        "message": message,
        "timestamp": timestamp(),
    });
    match serde_json::to_value(data) {
        Ok(Value::Null) => {}
        Ok(data) => body["data"] = data,
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize response body");
            return ApiError::Internal.into_response();
        }
    }
    (status, axum::Json(body)).into_response()
}

pub fn json_error(status: StatusCode, message: impl Into<String>, errors: Option<&ValidationErrors>) -> Response {
    let mut body = json!({
        "success": false,
        "message": message.into(),
        "timestamp": timestamp(),
    });
    if let Some(errors) = errors {
        body["errors"] = json!(errors);
    }
    (status, axum::Json(body)).into_response()
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(ValidationErrors),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    /// Details are logged where the error is raised, never sent to clients.
    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let errors = match &self {
            ApiError::Validation(errors) => Some(errors),
            _ => None,
        };
        json_error(self.status(), self.to_string(), errors)
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(errors)
    }
}

impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => ApiError::Unauthenticated(err.to_string()),
            AuthzError::RoleNotPermitted | AuthzError::NotOwner => {
                tracing::warn!(reason = %err, "authorization denied");
                ApiError::Forbidden(err.to_string())
            }
            AuthzError::InvalidUpdates { ref rejected } => {
                tracing::warn!(?rejected, "update carried keys outside the allow-list");
                ApiError::BadRequest(err.to_string())
            }
            AuthzError::InvalidCurrentPassword => ApiError::BadRequest(err.to_string()),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => ApiError::bad_request("User with this email already exists"),
            StoreError::NotFound => ApiError::not_found("Resource not found"),
            StoreError::Rejected(domain) => domain.into(),
            StoreError::Backend(msg) => {
                tracing::error!(error = %msg, "store failure");
                ApiError::Internal
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(errors) => ApiError::Validation(errors),
            DomainError::InvalidId(msg) => ApiError::BadRequest(msg),
            DomainError::Conflict(msg) => ApiError::BadRequest(msg),
        }
    }
}

impl From<CredentialError> for ApiError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidCredentials => ApiError::Unauthenticated("Invalid email or password".to_string()),
            CredentialError::Deactivated => {
                ApiError::Unauthenticated("Account is deactivated. Please contact support.".to_string())
            }
            CredentialError::DuplicateEmail => ApiError::bad_request("User with this email already exists"),
            CredentialError::InvalidCurrentPassword => ApiError::bad_request(err.to_string()),
            CredentialError::Validation(errors) => ApiError::Validation(errors),
            CredentialError::Password(e) => {
                tracing::error!(error = %e, "password hashing failed");
                ApiError::Internal
            }
            CredentialError::Store(e) => e.into(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidOrExpired => ApiError::Unauthenticated(err.to_string()),
            SessionError::Signing(msg) => {
                tracing::error!(error = %msg, "session signing failed");
                ApiError::Internal
            }
        }
    }
}
