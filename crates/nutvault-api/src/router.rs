//! Route assembly (spec §6). Three groups share one `AppState`: public
//! (no auth), bearer-authed reads (no rate limit beyond the global one),
//! and bearer-authed writes (the `RATE_LIMIT_MAX` middleware layer).

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{info, rate, wallet};
use crate::rate_limit::{create_wallet_limit, mutating_limit};
use crate::state::AppState;

/// Builds the full `/v1`-prefixed router. The caller is responsible for
/// serving it with `into_make_service_with_connect_info::<SocketAddr>()`
/// so the rate-limit middleware can read the peer's IP.
pub fn build_router(state: AppState) -> Router {
    let public = Router::new().route("/info", get(info::get_info));

    let create_wallet_route = Router::new()
        .route("/wallet", post(wallet::create_wallet))
        .route_layer(middleware::from_fn_with_state(state.clone(), create_wallet_limit));

    let reads = Router::new()
        .route("/wallet", get(wallet::get_wallet))
        .route("/wallet/deposit/{quote}", get(wallet::check_deposit_quote))
        .route("/wallet/pay/{quote}", get(wallet::check_melt_quote))
        .route("/rate/{currency}", get(rate::get_rate));

    let writes = Router::new()
        .route("/wallet/deposit", post(wallet::deposit))
        .route("/wallet/send", post(wallet::send))
        .route("/wallet/check", post(wallet::check))
        .route("/wallet/decode", post(wallet::decode))
        .route("/wallet/pay", post(wallet::pay))
        .route("/wallet/receive", post(wallet::receive))
        .route_layer(middleware::from_fn_with_state(state.clone(), mutating_limit));

    let v1 = public.merge(create_wallet_route).merge(reads).merge(writes);

    Router::new().nest("/v1", v1).layer(TraceLayer::new_for_http()).with_state(state)
}
