use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use holdings_service::{
    build_router,
    config::HoldingsConfig,
    error::AppError,
    services::{AccessGuard, AssetService, AuthService, JwtService, TotpVerifier},
    stores::{MemoryAssetStore, MemoryCredentialStore, MemoryDelegationRegistry},
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // Load configuration - fail fast if invalid
    let config = HoldingsConfig::from_env()?;

    init_tracing(&config.service_name, &config.log_level);

    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        environment = ?config.environment,
        "Starting holdings service"
    );

    // Default standalone wiring uses the in-memory stores; a deployment
    // against real collaborator systems swaps in its own trait impls.
    let credentials = Arc::new(MemoryCredentialStore::new());
    let delegations = Arc::new(MemoryDelegationRegistry::new());
    let assets = Arc::new(MemoryAssetStore::new());

    let jwt = JwtService::new(&config.jwt)?;
    tracing::info!("JWT service initialized");

    let store_timeout = Duration::from_secs(config.store_timeout_seconds);

    let auth_service = AuthService::new(
        credentials,
        jwt.clone(),
        Arc::new(TotpVerifier::default()),
        config.two_factor.issuer.clone(),
        store_timeout,
    );

    let guard = AccessGuard::new(delegations, store_timeout);
    let asset_service = AssetService::new(assets, guard, store_timeout);

    let state = AppState {
        config: config.clone(),
        jwt,
        auth_service,
        asset_service,
    };

    let app = build_router(state).await?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(address = %addr, "Listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    tracing::info!("Service shutdown complete");
    Ok(())
}

fn init_tracing(service_name: &str, log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={},tower_http=info", "holdings_service", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(service = service_name, "Tracing initialized");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }
}
