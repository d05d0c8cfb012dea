use std::sync::Arc;

use axum::{
    Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::Response,
    routing::{get, put},
};
use chrono::Utc;
use serde_json::Value;

use roomshare_auth::{PROFILE_UPDATE_FIELDS, ProfilePatch, User};
use roomshare_core::UserId;
use roomshare_infra::StoreError;

use crate::app::dto::{self, ChangePasswordRequest, ProfilePictureRequest, UserPayload, ValidJson};
use crate::app::errors::{self, ApiError};
use crate::app::routes::require_principal;
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/profile", put(update_profile))
        .route("/change-password", put(change_password))
        .route("/profile-picture", put(update_profile_picture))
        .route("/deactivate", put(deactivate))
        .route("/:id", get(get_user))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<ValidJson<Value>, ApiError>,
) -> Result<Response, ApiError> {
    let principal = require_principal(principal)?;
    let ValidJson(body) = body?;
    let patch: ProfilePatch = dto::decode_patch(body, PROFILE_UPDATE_FIELDS)?;

    let now = Utc::now();
    let user = services
        .users
        .update(
            principal.user().id,
            Box::new(move |u: &mut User| -> Result<(), StoreError> { Ok(patch.apply(u, now)?) }),
        )
        .await?;

    Ok(errors::success(StatusCode::OK, "Profile updated successfully", UserPayload::new(user)))
}

pub async fn change_password(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<ValidJson<ChangePasswordRequest>, ApiError>,
) -> Result<Response, ApiError> {
    let principal = require_principal(principal)?;
    let ValidJson(body) = body?;
    let (Some(current), Some(new)) = (body.current_password, body.new_password) else {
        return Err(ApiError::bad_request("Please provide current password and new password"));
    };
    if current.is_empty() || new.is_empty() {
        return Err(ApiError::bad_request("Please provide current password and new password"));
    }

    services
        .credentials
        .change_password(principal.user().id, &current, &new, Utc::now())
        .await?;

    Ok(errors::success(StatusCode::OK, "Password changed successfully", ()))
}

pub async fn update_profile_picture(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    body: Result<ValidJson<ProfilePictureRequest>, ApiError>,
) -> Result<Response, ApiError> {
    let principal = require_principal(principal)?;
    let ValidJson(body) = body?;
    let url = match body.profile_picture {
        Some(url) if !url.trim().is_empty() => url,
        _ => return Err(ApiError::bad_request("Profile picture URL is required")),
    };

    let now = Utc::now();
    let user = services
        .users
        .update(
            principal.user().id,
            Box::new(move |u: &mut User| -> Result<(), StoreError> {
                Ok(u.set_profile_picture(url.trim(), now)?)
            }),
        )
        .await?;

    Ok(errors::success(
        StatusCode::OK,
        "Profile picture updated successfully",
        UserPayload::new(user),
    ))
}

pub async fn deactivate(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
) -> Result<Response, ApiError> {
    let principal = require_principal(principal)?;
    let now = Utc::now();
    services
        .users
        .update(
            principal.user().id,
            Box::new(move |u: &mut User| {
                u.deactivate(now);
                Ok::<(), StoreError>(())
            }),
        )
        .await?;

    tracing::info!(user_id = %principal.user().id, "account deactivated");
    Ok(errors::success(StatusCode::OK, "Account deactivated successfully", ()))
}

pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    principal: Option<Extension<PrincipalContext>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    require_principal(principal)?;
    let not_found = || ApiError::not_found("User not found");

    let id: UserId = id.parse().map_err(|_| not_found())?;
    let user = match services.users.get(id).await? {
        Some(user) if user.is_active => user,
        _ => return Err(not_found()),
    };

    Ok(errors::success(StatusCode::OK, "User retrieved successfully", UserPayload::new(user)))
}
