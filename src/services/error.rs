use thiserror::Error;

use crate::error::AppError;

/// Error taxonomy of the authentication and authorization core.
///
/// Authentication and authorization failures are terminal for the
/// request; `DependencyUnavailable` is the only retryable variant and
/// the retry decision belongs to the caller.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Bad identifier or secret. Returned identically for "not found",
    /// "inactive" and "wrong secret" to avoid user enumeration.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The second-factor challenge reference is missing, malformed,
    /// forged or past its window.
    #[error("Challenge expired")]
    ChallengeExpired,

    #[error("Invalid second factor code")]
    InvalidSecondFactorCode,

    #[error("Token expired")]
    TokenExpired,

    #[error("Token malformed")]
    TokenMalformed,

    #[error("Token signature invalid")]
    TokenSignatureInvalid,

    /// Authorization failure in the access guard.
    #[error("Access denied")]
    AccessDenied,

    /// An external store timed out or failed; surfaced as retryable.
    #[error("Dependency unavailable: {0}")]
    DependencyUnavailable(String),

    #[error("Email already registered")]
    EmailAlreadyRegistered,

    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Asset not found")]
    AssetNotFound,

    #[error("Second factor not enrolled")]
    SecondFactorNotEnrolled,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            // All authentication failures collapse into one generic
            // 401 message; the distinction lives in the logs only.
            ServiceError::InvalidCredentials
            | ServiceError::TokenExpired
            | ServiceError::TokenMalformed
            | ServiceError::TokenSignatureInvalid => {
                AppError::AuthError(anyhow::anyhow!("Invalid credentials"))
            }
            ServiceError::ChallengeExpired => {
                AppError::AuthError(anyhow::anyhow!("Challenge expired"))
            }
            ServiceError::InvalidSecondFactorCode => {
                AppError::AuthError(anyhow::anyhow!("Invalid second factor code"))
            }
            // An unauthorized requester must not learn whether the
            // resource exists, so denial reads as "not found".
            ServiceError::AccessDenied => {
                AppError::NotFound(anyhow::anyhow!("Resource not found"))
            }
            ServiceError::DependencyUnavailable(msg) => AppError::ServiceUnavailable(msg),
            ServiceError::EmailAlreadyRegistered => {
                AppError::Conflict(anyhow::anyhow!("Email already registered"))
            }
            ServiceError::IdentityNotFound => {
                AppError::NotFound(anyhow::anyhow!("Identity not found"))
            }
            ServiceError::AssetNotFound => {
                AppError::NotFound(anyhow::anyhow!("Resource not found"))
            }
            ServiceError::SecondFactorNotEnrolled => {
                AppError::BadRequest(anyhow::anyhow!("Second factor not enrolled"))
            }
            ServiceError::Validation(msg) => AppError::ValidationError(msg),
            ServiceError::Internal(e) => AppError::InternalError(e),
        }
    }
}
