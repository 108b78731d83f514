use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::Role;
use crate::services::ServiceError;

/// Token kinds minted by this service.
///
/// `Challenge` is the short-lived reference returned by a login that
/// still awaits its second factor; it binds step one to step two and
/// is not accepted anywhere an access token is expected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
    Challenge,
}

/// Claims carried by every token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (identity ID)
    pub sub: String,
    /// Role at issuance time. Refresh re-resolves the role from the
    /// credential store instead of trusting this claim.
    pub role: Role,
    /// Token kind
    pub kind: TokenKind,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// JWT ID
    pub jti: String,
}

impl Claims {
    pub fn subject(&self) -> Result<Uuid, ServiceError> {
        Uuid::parse_str(&self.sub).map_err(|_| ServiceError::TokenMalformed)
    }
}

/// Token pair response returned to the client.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Token issuer and validator.
///
/// The signing key is immutable configuration injected at
/// construction; there is no global key state. Tokens are stateless -
/// no server-side record exists, so validity is solely a function of
/// signature and expiry. A leaked token stays valid until it expires
/// (accepted limitation; no denylist).
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expiry_minutes: i64,
    refresh_token_expiry_days: i64,
    challenge_expiry_minutes: i64,
    clock_skew_seconds: u64,
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if config.secret.len() < 32 {
            anyhow::bail!("JWT secret must be at least 32 bytes");
        }

        tracing::info!("JWT service initialized with HS256 key");

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_token_expiry_minutes: config.access_token_expiry_minutes,
            refresh_token_expiry_days: config.refresh_token_expiry_days,
            challenge_expiry_minutes: config.challenge_expiry_minutes,
            clock_skew_seconds: config.clock_skew_seconds,
        })
    }

    fn expiry_for(&self, kind: TokenKind) -> Duration {
        match kind {
            TokenKind::Access => Duration::minutes(self.access_token_expiry_minutes),
            TokenKind::Refresh => Duration::days(self.refresh_token_expiry_days),
            TokenKind::Challenge => Duration::minutes(self.challenge_expiry_minutes),
        }
    }

    /// Mint a signed, expiring token binding subject and role.
    pub fn issue(&self, subject: Uuid, role: Role, kind: TokenKind) -> Result<String, ServiceError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            kind,
            exp: (now + self.expiry_for(kind)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Failed to encode token: {}", e)))
    }

    /// Mint an access + refresh pair for a fully authenticated identity.
    pub fn issue_pair(&self, subject: Uuid, role: Role) -> Result<TokenResponse, ServiceError> {
        let access_token = self.issue(subject, role, TokenKind::Access)?;
        let refresh_token = self.issue(subject, role, TokenKind::Refresh)?;

        Ok(TokenResponse {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry_seconds(),
        })
    }

    /// Verify signature, expiry (strict, beyond the configured skew
    /// allowance) and structural well-formedness, and check the token
    /// is of the expected kind.
    ///
    /// Callers treat every error variant as "reject the request"; the
    /// variants exist so rejections can be logged distinctly.
    pub fn validate(&self, token: &str, expected: TokenKind) -> Result<Claims, ServiceError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = self.clock_skew_seconds;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServiceError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        ServiceError::TokenSignatureInvalid
                    }
                    _ => ServiceError::TokenMalformed,
                }
            })?;

        if token_data.claims.kind != expected {
            return Err(ServiceError::TokenMalformed);
        }

        Ok(token_data.claims)
    }

    /// Access token expiry in seconds (for client info)
    pub fn access_token_expiry_seconds(&self) -> i64 {
        self.access_token_expiry_minutes * 60
    }

    /// Challenge expiry in seconds (for client info)
    pub fn challenge_expiry_seconds(&self) -> i64 {
        self.challenge_expiry_minutes * 60
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> JwtConfig {
        JwtConfig {
            secret: "test-secret-which-is-long-enough-for-hs256".to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
            challenge_expiry_minutes: 5,
            clock_skew_seconds: 0,
        }
    }

    #[test]
    fn test_rejects_short_secret() {
        let config = JwtConfig {
            secret: "too-short".to_string(),
            ..test_config()
        };
        assert!(JwtService::new(&config).is_err());
    }

    #[test]
    fn test_issue_and_validate_each_kind() {
        let service = JwtService::new(&test_config()).unwrap();
        let subject = Uuid::new_v4();

        for kind in [TokenKind::Access, TokenKind::Refresh, TokenKind::Challenge] {
            let token = service.issue(subject, Role::Owner, kind).unwrap();
            let claims = service.validate(&token, kind).unwrap();
            assert_eq!(claims.subject().unwrap(), subject);
            assert_eq!(claims.role, Role::Owner);
            assert_eq!(claims.kind, kind);
        }
    }

    #[test]
    fn test_kind_mismatch_is_rejected() {
        let service = JwtService::new(&test_config()).unwrap();
        let subject = Uuid::new_v4();

        let refresh = service.issue(subject, Role::Owner, TokenKind::Refresh).unwrap();
        let err = service.validate(&refresh, TokenKind::Access).unwrap_err();
        assert!(matches!(err, ServiceError::TokenMalformed));

        // A challenge ref never passes for an access token.
        let challenge = service
            .issue(subject, Role::Owner, TokenKind::Challenge)
            .unwrap();
        let err = service.validate(&challenge, TokenKind::Access).unwrap_err();
        assert!(matches!(err, ServiceError::TokenMalformed));
    }

    #[test]
    fn test_expired_token_rejected_for_all_kinds() {
        let config = JwtConfig {
            access_token_expiry_minutes: -1,
            refresh_token_expiry_days: -1,
            challenge_expiry_minutes: -1,
            ..test_config()
        };
        let service = JwtService::new(&config).unwrap();
        let subject = Uuid::new_v4();

        for kind in [TokenKind::Access, TokenKind::Refresh, TokenKind::Challenge] {
            let token = service.issue(subject, Role::Delegate, kind).unwrap();
            let err = service.validate(&token, kind).unwrap_err();
            assert!(matches!(err, ServiceError::TokenExpired));
        }
    }

    #[test]
    fn test_clock_skew_allowance_applies() {
        // Expired one minute ago but within a five-minute leeway.
        let issuing = JwtService::new(&JwtConfig {
            access_token_expiry_minutes: -1,
            ..test_config()
        })
        .unwrap();
        let validating = JwtService::new(&JwtConfig {
            clock_skew_seconds: 300,
            ..test_config()
        })
        .unwrap();

        let token = issuing
            .issue(Uuid::new_v4(), Role::Owner, TokenKind::Access)
            .unwrap();
        assert!(validating.validate(&token, TokenKind::Access).is_ok());
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let service = JwtService::new(&test_config()).unwrap();
        let other = JwtService::new(&JwtConfig {
            secret: "another-secret-which-is-also-long-enough".to_string(),
            ..test_config()
        })
        .unwrap();

        let token = other
            .issue(Uuid::new_v4(), Role::Owner, TokenKind::Access)
            .unwrap();
        let err = service.validate(&token, TokenKind::Access).unwrap_err();
        assert!(matches!(err, ServiceError::TokenSignatureInvalid));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let service = JwtService::new(&test_config()).unwrap();
        let err = service
            .validate("not-even-a-jwt", TokenKind::Access)
            .unwrap_err();
        assert!(matches!(err, ServiceError::TokenMalformed));
    }

    #[test]
    fn test_pair_shares_subject_but_not_kind() {
        let service = JwtService::new(&test_config()).unwrap();
        let subject = Uuid::new_v4();

        let pair = service.issue_pair(subject, Role::Owner).unwrap();
        assert_eq!(pair.token_type, "Bearer");
        assert_eq!(pair.expires_in, 15 * 60);

        let access = service.validate(&pair.access_token, TokenKind::Access).unwrap();
        let refresh = service
            .validate(&pair.refresh_token, TokenKind::Refresh)
            .unwrap();
        assert_eq!(access.sub, refresh.sub);
        assert_ne!(access.jti, refresh.jti);
    }
}
