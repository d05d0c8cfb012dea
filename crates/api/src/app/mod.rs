//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store and session wiring
//! - `routes/`: HTTP routes + handlers (one file per area)
//! - `dto.rs`: request/response DTOs and the JSON extractor
//! - `errors.rs`: response envelope and error mapping

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = services::build_services(config).await?;
    Ok(build_router(services))
}

/// Router over already-built services.
pub fn build_router(services: AppServices) -> Router {
    let auth_state = middleware::AuthState {
        sessions: Arc::clone(&services.sessions),
        users: Arc::clone(&services.users),
    };

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(Extension(Arc::new(services)))
                .layer(axum::middleware::from_fn_with_state(
                    auth_state,
                    middleware::session_middleware,
                )),
        )
}
