use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

#[allow(unused_imports)]
use crate::dtos::ErrorResponse;

use crate::{
    dtos::auth::{
        LoginRequest, LoginResponse, RefreshRequest, RegisterRequest, RegisterResponse,
        TwoFactorVerifyRequest,
    },
    error::AppError,
    utils::ValidatedJson,
    AppState,
};

/// Register a new identity
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Identity registered", body = RegisterResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(res)))
}

/// Login with email and secret
///
/// Identities with a second factor enrolled get `challenge_required`
/// and no usable access token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated or challenge required", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse),
        (status = 503, description = "Credential store unavailable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth_service.login(req).await?;
    Ok((StatusCode::OK, Json(res)))
}

/// Complete the second-factor step of a pending login
#[utoipa::path(
    post,
    path = "/auth/two-factor/verify",
    request_body = TwoFactorVerifyRequest,
    responses(
        (status = 200, description = "Authenticated", body = LoginResponse),
        (status = 401, description = "Challenge expired or code invalid", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn verify_two_factor(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TwoFactorVerifyRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth_service.complete_second_factor(req).await?;
    Ok((StatusCode::OK, Json(res)))
}

/// Rotate a refresh token into a fresh access + refresh pair
#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token pair rotated", body = LoginResponse),
        (status = 401, description = "Invalid or expired refresh token", body = ErrorResponse),
        (status = 503, description = "Credential store unavailable", body = ErrorResponse)
    ),
    tag = "Authentication"
)]
pub async fn refresh(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshRequest>,
) -> Result<impl IntoResponse, AppError> {
    let res = state.auth_service.refresh(req).await?;
    Ok((StatusCode::OK, Json(res)))
}
