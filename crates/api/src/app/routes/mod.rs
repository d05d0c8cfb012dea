use axum::{Extension, Router};

use roomshare_auth::AuthzError;

use crate::app::errors::ApiError;
use crate::context::PrincipalContext;

pub mod auth;
pub mod properties;
pub mod system;
pub mod users;

/// Router for every API area. Sessions are optional at this level; handlers
/// that need one call [`require_principal`].
pub fn router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/properties", properties::router())
        .nest("/users", users::router())
}

pub(crate) fn require_principal(principal: Option<Extension<PrincipalContext>>) -> Result<PrincipalContext, ApiError> {
    match principal {
        Some(Extension(principal)) => Ok(principal),
        None => Err(AuthzError::Unauthenticated.into()),
    }
}
