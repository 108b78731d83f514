pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod stores;
pub mod utils;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::SecurityScheme,
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::HoldingsConfig;
use crate::error::AppError;
use crate::services::{AssetService, AuthService, JwtService};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::verify_two_factor,
        handlers::auth::refresh,
        handlers::user::get_me,
        handlers::user::enable_two_factor,
        handlers::user::disable_two_factor,
        handlers::user::deactivate,
        handlers::asset::create_asset,
        handlers::asset::list_assets,
        handlers::asset::get_asset,
        handlers::asset::update_asset,
        handlers::asset::delete_asset,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::auth::RegisterRequest,
            dtos::auth::RegisterResponse,
            dtos::auth::TwoFactorEnrollment,
            dtos::auth::LoginRequest,
            dtos::auth::LoginResponse,
            dtos::auth::TwoFactorVerifyRequest,
            dtos::auth::RefreshRequest,
            dtos::asset::CreateAssetRequest,
            dtos::asset::UpdateAssetRequest,
            services::TokenResponse,
            models::IdentityResponse,
            models::Role,
            models::AssetRecord,
            models::AssetKind,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Login, second factor and token refresh"),
        (name = "User", description = "Identity profile and second-factor enrollment"),
        (name = "Assets", description = "Owner asset records with delegated access"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: HoldingsConfig,
    pub jwt: JwtService,
    pub auth_service: AuthService,
    pub asset_service: AssetService,
}

pub async fn build_router(state: AppState) -> Result<Router, AppError> {
    // Routes behind the bearer-token checkpoint
    let protected = Router::new()
        .route("/users/me", get(handlers::user::get_me))
        .route(
            "/users/me/two-factor/enable",
            post(handlers::user::enable_two_factor),
        )
        .route(
            "/users/me/two-factor/disable",
            post(handlers::user::disable_two_factor),
        )
        .route("/users/me/deactivate", post(handlers::user::deactivate))
        .route(
            "/owners/:owner_id/assets",
            post(handlers::asset::create_asset).get(handlers::asset::list_assets),
        )
        .route(
            "/owners/:owner_id/assets/:asset_id",
            get(handlers::asset::get_asset)
                .put(handlers::asset::update_asset)
                .delete(handlers::asset::delete_asset),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let mut app = Router::new().route("/health", get(health_check));

    let swagger_enabled = match state.config.environment {
        config::Environment::Dev => true,
        config::Environment::Prod => state.config.swagger.enabled == config::SwaggerMode::Public,
    };

    if swagger_enabled {
        app =
            app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    }

    let app = app
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route(
            "/auth/two-factor/verify",
            post(handlers::auth::verify_two_factor),
        )
        .route("/auth/refresh", post(handlers::auth::refresh))
        .merge(protected)
        .with_state(state.clone())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(
                    state
                        .config
                        .security
                        .allowed_origins
                        .iter()
                        .filter_map(|origin| {
                            origin
                                .parse::<axum::http::HeaderValue>()
                                .map_err(|e| {
                                    tracing::error!("Invalid CORS origin '{}': {}", origin, e);
                                    e
                                })
                                .ok()
                        })
                        .collect::<Vec<axum::http::HeaderValue>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::AUTHORIZATION,
                    axum::http::header::CONTENT_TYPE,
                ]),
        );

    Ok(app)
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy")
    ),
    tag = "Observability"
)]
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
    }))
}
