use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::{IdentityResponse, Role};
use crate::services::TokenResponse;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Ana Costa")]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "owner@example.com")]
    pub email: String,

    #[validate(length(min = 8, message = "Secret must be at least 8 characters"))]
    #[schema(example = "password123", min_length = 8)]
    pub password: String,

    pub role: Role,

    #[serde(default)]
    pub enable_two_factor: bool,
}

/// Second-factor enrollment material returned exactly once, at
/// enrollment time. The seed is never readable again afterwards.
#[derive(Debug, Serialize, ToSchema)]
pub struct TwoFactorEnrollment {
    pub seed: String,
    #[schema(example = "otpauth://totp/Holdings:owner@example.com?secret=...&issuer=Holdings")]
    pub provisioning_uri: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RegisterResponse {
    pub identity: IdentityResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub two_factor: Option<TwoFactorEnrollment>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "owner@example.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Secret is required"))]
    #[schema(example = "password123")]
    pub password: String,
}

/// Outcome of a login step.
///
/// A second-factor-enrolled identity gets `challenge_required` and no
/// usable access credential; the opaque `challenge_ref` must be echoed
/// back to `/auth/two-factor/verify` together with the code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoginResponse {
    Authenticated { tokens: TokenResponse },
    ChallengeRequired { challenge_ref: String, expires_in: i64 },
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TwoFactorVerifyRequest {
    #[validate(length(min = 1, message = "Challenge reference is required"))]
    pub challenge_ref: String,

    #[validate(length(min = 1, message = "Code is required"))]
    #[schema(example = "123456")]
    pub code: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub refresh_token: String,
}
