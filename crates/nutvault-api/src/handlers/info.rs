use axum::extract::State;
use axum::Json;

use crate::dto::{InfoLimits, InfoResponse};
use crate::state::AppState;

/// `GET /info` (spec §6) — public, no auth, no rate limit.
pub async fn get_info(State(state): State<AppState>) -> Json<InfoResponse> {
    let cfg = &state.config;
    Json(InfoResponse {
        status: cfg.service_status.clone(),
        help: cfg.service_help.clone(),
        terms: cfg.service_terms.clone(),
        unit: cfg.unit,
        mint: cfg.mint_url.clone(),
        limits: InfoLimits {
            max_balance: cfg.limits.max_balance,
            max_send: cfg.limits.max_send,
            max_pay: cfg.limits.max_pay,
            rate_limit_max: cfg.rate_limit_max,
            rate_limit_create_wallet_max: cfg.rate_limit_create_wallet_max,
            rate_limit_window_secs: cfg.rate_limit_window.as_secs(),
        },
    })
}
