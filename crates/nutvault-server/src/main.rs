//! The NutVault service binary: reads configuration from the environment,
//! wires up storage, the mint client, and the proof engine, then serves
//! the `/v1` HTTP facade.

mod config;

use std::sync::Arc;

use anyhow::Result;
use nutvault_api::{ApiConfig, AppState, RateLimiter};
use nutvault_engine::{HttpPriceOracle, ProofEngine, RateCache};
use nutvault_mint_client::{HttpMintClient, LightningInvoiceDecoder};
use nutvault_store::{PostgresStore, Store};
use tracing_subscriber::EnvFilter;

use crate::config::Settings;

fn setup_tracing() {
    let default_filter = "info";
    let hyper_filter = "hyper=warn,rustls=warn,reqwest=warn";
    let h2_filter = "h2=warn";
    let tower_http = "tower_http=warn";

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_filter},{hyper_filter},{h2_filter},{tower_http}")));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_tracing();

    // Fail fast on a bad configuration, before any socket is bound (A10).
    let settings = Settings::from_env()?;
    tracing::info!(mint = %settings.mint_url, listen = %settings.listen_addr, "starting nutvault-server");

    let http = reqwest::Client::new();

    let store: Arc<dyn Store> =
        Arc::new(PostgresStore::connect(&settings.database_url, settings.database_pool_max_size, settings.database_connect_timeout).await?);
    let mint: Arc<dyn nutvault_mint_client::MintClient> = Arc::new(HttpMintClient::new(http.clone()));
    let engine = Arc::new(ProofEngine::new(store.clone(), mint.clone(), settings.limits));
    let rate_cache = Arc::new(RateCache::new(HttpPriceOracle::new(http)));

    let config = Arc::new(ApiConfig {
        service_status: settings.service_status.clone(),
        service_help: settings.service_help.clone(),
        service_terms: settings.service_terms.clone(),
        mint_url: settings.mint_url.clone(),
        unit: settings.unit,
        limits: settings.limits,
        rate_limit_max: settings.rate_limit_max,
        rate_limit_create_wallet_max: settings.rate_limit_create_wallet_max,
        rate_limit_window: settings.rate_limit_window,
    });

    let state = AppState {
        engine,
        store,
        mint,
        rate_cache,
        bolt11: Arc::new(LightningInvoiceDecoder),
        config,
        create_wallet_limiter: Arc::new(RateLimiter::new(settings.rate_limit_create_wallet_max, settings.rate_limit_window)),
        mutating_limiter: Arc::new(RateLimiter::new(settings.rate_limit_max, settings.rate_limit_window)),
    };

    let router = nutvault_api::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.listen_addr).await?;
    tracing::info!(addr = %settings.listen_addr, "listening");

    axum::serve(listener, router.into_make_service_with_connect_info::<std::net::SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
