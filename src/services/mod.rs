//! Services layer.
//!
//! Business logic for authentication, token issuance and the
//! ownership-or-delegation access check.

mod access;
mod asset;
mod jwt;

pub mod auth;
pub mod error;
pub mod totp;

pub use access::AccessGuard;
pub use asset::AssetService;
pub use auth::AuthService;
pub use error::ServiceError;
pub use jwt::{Claims, JwtService, TokenKind, TokenResponse};
pub use totp::{SecondFactorVerifier, TotpVerifier};
