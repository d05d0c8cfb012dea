use axum::{http::StatusCode, response::Response};

use crate::app::errors;

pub async fn health() -> Response {
    errors::success(StatusCode::OK, "Server is running", ())
}
