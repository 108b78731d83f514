use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

#[allow(unused_imports)]
use crate::dtos::{auth::TwoFactorEnrollment, ErrorResponse};
#[allow(unused_imports)]
use crate::models::IdentityResponse;

use crate::{error::AppError, middleware::AuthUser, AppState};

/// Get the authenticated identity's profile
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Identity profile", body = IdentityResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let subject = user.0.subject()?;
    let res = state.auth_service.get_identity(subject).await?;
    Ok((StatusCode::OK, Json(res)))
}

/// Enroll the second factor, rotating any previous seed
#[utoipa::path(
    post,
    path = "/users/me/two-factor/enable",
    responses(
        (status = 200, description = "Enrollment material", body = TwoFactorEnrollment),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn enable_two_factor(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let subject = user.0.subject()?;
    let res = state.auth_service.enable_two_factor(subject).await?;
    Ok((StatusCode::OK, Json(res)))
}

/// Disable the second factor and discard the seed
#[utoipa::path(
    post,
    path = "/users/me/two-factor/disable",
    responses(
        (status = 200, description = "Updated profile", body = IdentityResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn disable_two_factor(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let subject = user.0.subject()?;
    let res = state.auth_service.disable_two_factor(subject).await?;
    Ok((StatusCode::OK, Json(res)))
}

/// Deactivate the authenticated identity
///
/// Outstanding tokens stop working at their next store-backed check
/// (refresh, or any lookup that re-reads the identity).
#[utoipa::path(
    post,
    path = "/users/me/deactivate",
    responses(
        (status = 200, description = "Deactivated profile", body = IdentityResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "User",
    security(("bearer_auth" = []))
)]
pub async fn deactivate(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let subject = user.0.subject()?;
    let res = state.auth_service.deactivate(subject).await?;
    Ok((StatusCode::OK, Json(res)))
}
