use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use roomshare_auth::SessionIssuer;
use roomshare_infra::UserStore;

use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionIssuer>,
    pub users: Arc<dyn UserStore>,
}

/// Attach a [`PrincipalContext`] when the request carries a usable session.
///
/// Requests without one pass through unchanged; public routes serve them and
/// protected handlers refuse them.
pub async fn session_middleware(
    State(state): State<AuthState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    if let Some(token) = extract_bearer(req.headers()).map(str::to_owned) {
        if let Some(principal) = resolve_session(&state, &token).await {
            req.extensions_mut().insert(principal);
        }
    }
    next.run(req).await
}

async fn resolve_session(state: &AuthState, token: &str) -> Option<PrincipalContext> {
    let claims = match state.sessions.verify(token, Utc::now()) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "rejected session token");
            return None;
        }
    };

    match state.users.get(claims.sub).await {
        Ok(Some(user)) if user.is_active => Some(PrincipalContext::new(user)),
        Ok(Some(_)) => {
            tracing::warn!(user_id = %claims.sub, "session for deactivated account");
            None
        }
        Ok(None) => {
            tracing::warn!(user_id = %claims.sub, "session for unknown account");
            None
        }
        Err(e) => {
            tracing::error!(user_id = %claims.sub, error = %e, "failed to load session user");
            None
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers), Some("abc.def"));

        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert(axum::http::header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);
    }
}
