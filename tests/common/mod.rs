//! Test helpers: in-memory wiring plus request plumbing for driving
//! the router with `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::util::ServiceExt;
use uuid::Uuid;

use holdings_service::{
    build_router,
    config::{
        Environment, HoldingsConfig, JwtConfig, SecurityConfig, SwaggerConfig, SwaggerMode,
        TwoFactorConfig,
    },
    services::{AccessGuard, AssetService, AuthService, JwtService, TotpVerifier},
    stores::{MemoryAssetStore, MemoryCredentialStore, MemoryDelegationRegistry},
    AppState,
};

pub const TEST_JWT_SECRET: &str = "test-secret-which-is-long-enough-for-hs256";

pub fn test_config() -> HoldingsConfig {
    HoldingsConfig {
        environment: Environment::Prod,
        service_name: "holdings-service".to_string(),
        service_version: "test".to_string(),
        log_level: "error".to_string(),
        port: 8080,
        jwt: JwtConfig {
            secret: TEST_JWT_SECRET.to_string(),
            access_token_expiry_minutes: 15,
            refresh_token_expiry_days: 7,
            challenge_expiry_minutes: 5,
            clock_skew_seconds: 0,
        },
        two_factor: TwoFactorConfig {
            issuer: "Holdings".to_string(),
        },
        security: SecurityConfig {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        },
        swagger: SwaggerConfig {
            enabled: SwaggerMode::Disabled,
        },
        store_timeout_seconds: 2,
    }
}

pub struct TestApp {
    pub router: Router,
    pub registry: Arc<MemoryDelegationRegistry>,
}

pub async fn spawn_app() -> TestApp {
    let config = test_config();

    let credentials = Arc::new(MemoryCredentialStore::new());
    let delegations = Arc::new(MemoryDelegationRegistry::new());
    let assets = Arc::new(MemoryAssetStore::new());

    let jwt = JwtService::new(&config.jwt).expect("Failed to create JWT service");
    let store_timeout = Duration::from_secs(config.store_timeout_seconds);

    let auth_service = AuthService::new(
        credentials,
        jwt.clone(),
        Arc::new(TotpVerifier::default()),
        config.two_factor.issuer.clone(),
        store_timeout,
    );
    let guard = AccessGuard::new(delegations.clone(), store_timeout);
    let asset_service = AssetService::new(assets, guard, store_timeout);

    let state = AppState {
        config,
        jwt,
        auth_service,
        asset_service,
    };

    let router = build_router(state).await.expect("Failed to build router");

    TestApp {
        router,
        registry: delegations,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("Response body is not JSON")
        };

        (status, json)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, None, Some(body)).await
    }

    /// POST a raw body without JSON encoding, for exercising parse
    /// failures.
    pub async fn post_raw(&self, uri: &str, body: &'static str) -> StatusCode {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("Request failed")
            .status()
    }

    /// Register an identity, returning its ID.
    pub async fn register(&self, email: &str, password: &str, role: &str) -> Uuid {
        let (status, body) = self
            .post(
                "/auth/register",
                serde_json::json!({
                    "name": "Test User",
                    "email": email,
                    "password": password,
                    "role": role,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        body["identity"]["id"]
            .as_str()
            .and_then(|id| id.parse().ok())
            .expect("register response missing identity id")
    }

    /// Register without a second factor and log in, returning
    /// (identity id, access token, refresh token).
    pub async fn register_and_login(
        &self,
        email: &str,
        password: &str,
        role: &str,
    ) -> (Uuid, String, String) {
        let id = self.register(email, password, role).await;

        let (status, body) = self
            .post(
                "/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        assert_eq!(body["status"], "authenticated");

        let access = body["tokens"]["access_token"]
            .as_str()
            .expect("missing access token")
            .to_string();
        let refresh = body["tokens"]["refresh_token"]
            .as_str()
            .expect("missing refresh token")
            .to_string();

        (id, access, refresh)
    }
}
