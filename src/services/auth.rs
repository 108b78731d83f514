use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::{
    dtos::auth::{
        LoginRequest, LoginResponse, RefreshRequest, RegisterRequest, RegisterResponse,
        TwoFactorEnrollment, TwoFactorVerifyRequest,
    },
    models::{Identity, IdentityResponse},
    services::{
        totp::{self, SecondFactorVerifier},
        JwtService, ServiceError, TokenKind,
    },
    stores::CredentialStore,
    utils::{hash_secret, verify_secret, Secret, SecretHash},
};

/// Wrong-code attempts allowed against a single challenge ref before
/// it is burned and the client must log in again.
const MAX_CHALLENGE_ATTEMPTS: u32 = 5;

/// Usage record for one challenge ref, keyed by its `jti`.
#[derive(Debug)]
struct ChallengeUsage {
    expires_at: i64,
    failed_attempts: u32,
    consumed: bool,
}

/// Orchestrates login, the optional second-factor step, token refresh
/// and identity lifecycle toggles.
///
/// Per login attempt: `Start -> [credentials verified] ->
/// (Issued | PendingChallenge) -> [code verified] -> Issued`, with
/// `Rejected` terminal at every step. The pending state itself is
/// carried inside the signed challenge ref; the `challenges` map only
/// tracks consumption and failed attempts, so a ref dies on expiry,
/// on reuse after success, or after too many wrong codes.
#[derive(Clone)]
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    jwt: JwtService,
    second_factor: Arc<dyn SecondFactorVerifier>,
    totp_issuer: String,
    store_timeout: Duration,
    challenges: Arc<DashMap<String, ChallengeUsage>>,
}

impl AuthService {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        jwt: JwtService,
        second_factor: Arc<dyn SecondFactorVerifier>,
        totp_issuer: String,
        store_timeout: Duration,
    ) -> Self {
        Self {
            credentials,
            jwt,
            second_factor,
            totp_issuer,
            store_timeout,
            challenges: Arc::new(DashMap::new()),
        }
    }

    /// Run an external store call with the configured timeout bound,
    /// so a slow dependency cannot exhaust server concurrency.
    async fn store_call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, ServiceError> {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| {
                tracing::warn!(operation, "Credential store call timed out");
                ServiceError::DependencyUnavailable("credential store timeout".to_string())
            })?
            .map_err(|e| {
                tracing::error!(operation, error = %e, "Credential store call failed");
                ServiceError::DependencyUnavailable("credential store error".to_string())
            })
    }

    /// Register a new identity, optionally enrolling its second factor.
    pub async fn register(&self, req: RegisterRequest) -> Result<RegisterResponse, ServiceError> {
        let email = req.email.to_lowercase();

        if self
            .store_call("find_by_email", self.credentials.find_by_email(&email))
            .await?
            .is_some()
        {
            return Err(ServiceError::EmailAlreadyRegistered);
        }

        let secret_hash = hash_secret(&Secret::new(req.password))
            .map_err(|e| ServiceError::Internal(anyhow::anyhow!("Secret hashing error: {}", e)))?;

        let mut identity = Identity::new(req.name, email, secret_hash.into_string(), req.role);

        let two_factor = if req.enable_two_factor {
            let seed = totp::generate_seed();
            identity.two_factor_enabled = true;
            identity.two_factor_seed = Some(seed.clone());
            Some(TwoFactorEnrollment {
                provisioning_uri: totp::provisioning_uri(&self.totp_issuer, &identity.email, &seed),
                seed,
            })
        } else {
            None
        };

        let identity = self
            .store_call("save", self.credentials.save(identity))
            .await?;

        tracing::info!(user_id = %identity.id, role = identity.role.as_str(), "Identity registered");

        Ok(RegisterResponse {
            identity: identity.sanitized(),
            two_factor,
        })
    }

    /// First login step: verify identifier and secret.
    ///
    /// "Not found", "inactive" and "wrong secret" are indistinguishable
    /// in the outcome; only the logs know which sub-check failed.
    pub async fn login(&self, req: LoginRequest) -> Result<LoginResponse, ServiceError> {
        let email = req.email.to_lowercase();

        let identity = match self
            .store_call("find_by_email", self.credentials.find_by_email(&email))
            .await?
        {
            Some(identity) => identity,
            None => {
                tracing::warn!("Login attempt for unknown identifier");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !identity.active {
            tracing::warn!(user_id = %identity.id, "Login attempt for inactive identity");
            return Err(ServiceError::InvalidCredentials);
        }

        verify_secret(
            &Secret::new(req.password),
            &SecretHash::new(identity.secret_hash.clone()),
        )
        .map_err(|_| {
            tracing::warn!(user_id = %identity.id, "Secret verification failed");
            ServiceError::InvalidCredentials
        })?;

        if identity.two_factor_enabled {
            // No usable access credential yet: the challenge ref is a
            // signed, short-lived token binding this verified identity
            // to the upcoming second-factor step.
            let challenge_ref = self
                .jwt
                .issue(identity.id, identity.role, TokenKind::Challenge)?;
            tracing::info!(user_id = %identity.id, "Login pending second factor");
            return Ok(LoginResponse::ChallengeRequired {
                challenge_ref,
                expires_in: self.jwt.challenge_expiry_seconds(),
            });
        }

        tracing::info!(user_id = %identity.id, "Login successful");
        Ok(LoginResponse::Authenticated {
            tokens: self.jwt.issue_pair(identity.id, identity.role)?,
        })
    }

    /// Reject challenge refs that were already completed or have
    /// burned through their wrong-code allowance. Expired entries are
    /// purged on the way through so the map stays bounded by the
    /// challenge window.
    fn check_challenge_usage(&self, jti: &str) -> Result<(), ServiceError> {
        let now = Utc::now().timestamp();
        self.challenges.retain(|_, usage| usage.expires_at > now);

        if let Some(usage) = self.challenges.get(jti) {
            if usage.consumed {
                tracing::warn!("Challenge ref replayed after completion");
                return Err(ServiceError::ChallengeExpired);
            }
            if usage.failed_attempts >= MAX_CHALLENGE_ATTEMPTS {
                tracing::warn!("Challenge ref exhausted its code attempts");
                return Err(ServiceError::ChallengeExpired);
            }
        }
        Ok(())
    }

    fn record_challenge_failure(&self, jti: &str, expires_at: i64) {
        self.challenges
            .entry(jti.to_string())
            .or_insert(ChallengeUsage {
                expires_at,
                failed_attempts: 0,
                consumed: false,
            })
            .failed_attempts += 1;
    }

    fn consume_challenge(&self, jti: &str, expires_at: i64) {
        self.challenges
            .entry(jti.to_string())
            .or_insert(ChallengeUsage {
                expires_at,
                failed_attempts: 0,
                consumed: false,
            })
            .consumed = true;
    }

    /// Second login step: verify the one-time code against the
    /// identity bound by the challenge ref.
    ///
    /// A ref is single-use: completing it once consumes it, and a
    /// replay is rejected exactly like an expired ref.
    pub async fn complete_second_factor(
        &self,
        req: TwoFactorVerifyRequest,
    ) -> Result<LoginResponse, ServiceError> {
        let claims = self
            .jwt
            .validate(&req.challenge_ref, TokenKind::Challenge)
            .map_err(|e| {
                tracing::warn!(error = %e, "Challenge ref rejected");
                ServiceError::ChallengeExpired
            })?;
        let subject = claims.subject().map_err(|_| ServiceError::ChallengeExpired)?;

        self.check_challenge_usage(&claims.jti)?;

        let identity = self
            .store_call("find_by_id", self.credentials.find_by_id(subject))
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !identity.active {
            return Err(ServiceError::InvalidCredentials);
        }

        let seed = identity
            .two_factor_seed
            .as_deref()
            .filter(|_| identity.two_factor_enabled)
            .ok_or(ServiceError::SecondFactorNotEnrolled)?;

        if !self.second_factor.verify(seed, &req.code) {
            self.record_challenge_failure(&claims.jti, claims.exp);
            tracing::warn!(user_id = %identity.id, "Second factor code rejected");
            return Err(ServiceError::InvalidSecondFactorCode);
        }

        self.consume_challenge(&claims.jti, claims.exp);
        tracing::info!(user_id = %identity.id, "Second factor verified");
        Ok(LoginResponse::Authenticated {
            tokens: self.jwt.issue_pair(identity.id, identity.role)?,
        })
    }

    /// Exchange a refresh token for a fresh access + refresh pair.
    ///
    /// Role and activation are re-resolved from the credential store
    /// at refresh time, never trusted from the stale claims, so role
    /// changes and deactivation take effect immediately. The old
    /// refresh token stays valid until its own expiry (no denylist).
    pub async fn refresh(&self, req: RefreshRequest) -> Result<LoginResponse, ServiceError> {
        let claims = self
            .jwt
            .validate(&req.refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                tracing::warn!(error = %e, "Refresh token rejected");
                ServiceError::InvalidCredentials
            })?;
        let subject = claims.subject().map_err(|_| ServiceError::InvalidCredentials)?;

        let identity = self
            .store_call("find_by_id", self.credentials.find_by_id(subject))
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        if !identity.active {
            tracing::warn!(user_id = %identity.id, "Refresh attempt for inactive identity");
            return Err(ServiceError::InvalidCredentials);
        }

        tracing::info!(user_id = %identity.id, "Token refreshed");
        Ok(LoginResponse::Authenticated {
            tokens: self.jwt.issue_pair(identity.id, identity.role)?,
        })
    }

    /// Fetch the sanitized identity for an authenticated subject.
    pub async fn get_identity(&self, id: Uuid) -> Result<IdentityResponse, ServiceError> {
        let identity = self
            .store_call("find_by_id", self.credentials.find_by_id(id))
            .await?
            .ok_or(ServiceError::IdentityNotFound)?;
        Ok(identity.sanitized())
    }

    /// Enroll (or re-enroll, rotating the seed) the second factor.
    pub async fn enable_two_factor(&self, id: Uuid) -> Result<TwoFactorEnrollment, ServiceError> {
        let mut identity = self
            .store_call("find_by_id", self.credentials.find_by_id(id))
            .await?
            .ok_or(ServiceError::IdentityNotFound)?;

        let seed = totp::generate_seed();
        identity.two_factor_enabled = true;
        identity.two_factor_seed = Some(seed.clone());

        let identity = self
            .store_call("save", self.credentials.save(identity))
            .await?;

        tracing::info!(user_id = %identity.id, "Second factor enrolled");
        Ok(TwoFactorEnrollment {
            provisioning_uri: totp::provisioning_uri(&self.totp_issuer, &identity.email, &seed),
            seed,
        })
    }

    /// Drop second-factor enrollment and discard the seed.
    pub async fn disable_two_factor(&self, id: Uuid) -> Result<IdentityResponse, ServiceError> {
        let mut identity = self
            .store_call("find_by_id", self.credentials.find_by_id(id))
            .await?
            .ok_or(ServiceError::IdentityNotFound)?;

        identity.two_factor_enabled = false;
        identity.two_factor_seed = None;

        let identity = self
            .store_call("save", self.credentials.save(identity))
            .await?;

        tracing::info!(user_id = %identity.id, "Second factor disabled");
        Ok(identity.sanitized())
    }

    /// Deactivate an identity. A flag flip, never a hard delete;
    /// outstanding tokens die at their next store-backed check.
    pub async fn deactivate(&self, id: Uuid) -> Result<IdentityResponse, ServiceError> {
        let mut identity = self
            .store_call("find_by_id", self.credentials.find_by_id(id))
            .await?
            .ok_or(ServiceError::IdentityNotFound)?;

        identity.active = false;

        let identity = self
            .store_call("save", self.credentials.save(identity))
            .await?;

        tracing::info!(user_id = %identity.id, "Identity deactivated");
        Ok(identity.sanitized())
    }
}
