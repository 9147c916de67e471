//! Bearer-token wallet authentication (spec §4.6). `GET /info` and
//! `POST /wallet` are the only routes that do not use this extractor.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use nutvault_common::{AppError, Wallet};

use crate::error_response::AppErrorResponse;
use crate::state::AppState;

/// The wallet named by a request's `Authorization: Bearer <hex>` header.
pub struct BearerWallet(pub Wallet);

impl FromRequestParts<AppState> for BearerWallet {
    type Rejection = AppErrorResponse;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppErrorResponse(AppError::unauthorized("missing Authorization header")))?;

        let access_key = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| AppErrorResponse(AppError::unauthorized("Authorization header must be a Bearer token")))?;

        let wallet = state
            .store
            .find_wallet_by_access_key(access_key)
            .await
            .map_err(|err| AppErrorResponse(err.into()))?;

        wallet.map(BearerWallet).ok_or_else(|| {
            // A11: never log the raw key, only enough of it to correlate
            // repeated failures without reconstructing the credential.
            let prefix: String = access_key.chars().take(6).collect();
            tracing::warn!(key_prefix = %prefix, "bearer auth rejected: unknown access key");
            AppErrorResponse(AppError::unauthorized("invalid access key"))
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::Request;
    use nutvault_store::mock::MockStore;
    use nutvault_store::Store;

    use super::*;

    async fn parts_for(header: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/v1/wallet");
        if let Some(h) = header {
            builder = builder.header(AUTHORIZATION, h);
        }
        let (parts, _) = builder.body(Body::empty()).expect("valid request").into_parts();
        parts
    }

    #[tokio::test]
    async fn missing_header_is_rejected_with_401() {
        let store: Arc<dyn Store> = Arc::new(MockStore::new());
        let wallet = store
            .create_wallet("deadbeef", None, "https://mint.example", nutvault_common::CurrencyUnit::Sat, Default::default())
            .await;
        assert!(wallet.is_ok());

        let mut parts = parts_for(None).await;
        let err = match BearerWallet::from_request_parts(&mut parts, &fake_state(store)).await {
            Ok(_) => panic!("expected rejection"),
            Err(e) => e,
        };
        assert_eq!(err.0.kind, nutvault_common::ErrorKind::Unauthorized);
    }

    #[tokio::test]
    async fn garbled_header_is_rejected_before_any_lookup() {
        let store: Arc<dyn Store> = Arc::new(MockStore::new());
        let mut parts = parts_for(Some("Basic whatever")).await;
        let err = match BearerWallet::from_request_parts(&mut parts, &fake_state(store)).await {
            Ok(_) => panic!("expected rejection"),
            Err(e) => e,
        };
        assert_eq!(err.0.kind, nutvault_common::ErrorKind::Unauthorized);
    }

    fn fake_state(store: Arc<dyn Store>) -> AppState {
        use std::time::Duration;

        use nutvault_common::Limits;
        use nutvault_engine::{HttpPriceOracle, ProofEngine, RateCache};
        use nutvault_mint_client::mock::MockMintClient;
        use nutvault_mint_client::LightningInvoiceDecoder;

        use crate::config::ApiConfig;
        use crate::rate_limit::RateLimiter;

        let mint = Arc::new(MockMintClient::new());
        AppState {
            engine: Arc::new(ProofEngine::new(store.clone(), mint.clone(), Limits::default())),
            store,
            mint,
            rate_cache: Arc::new(RateCache::new(HttpPriceOracle::new(reqwest::Client::new()))),
            bolt11: Arc::new(LightningInvoiceDecoder),
            config: Arc::new(ApiConfig {
                service_status: "ready".into(),
                service_help: "".into(),
                service_terms: "".into(),
                mint_url: "https://mint.example".into(),
                unit: nutvault_common::CurrencyUnit::Sat,
                limits: Limits::default(),
                rate_limit_max: 100,
                rate_limit_create_wallet_max: 10,
                rate_limit_window: Duration::from_secs(60),
            }),
            create_wallet_limiter: Arc::new(RateLimiter::new(10, Duration::from_secs(60))),
            mutating_limiter: Arc::new(RateLimiter::new(100, Duration::from_secs(60))),
        }
    }
}
