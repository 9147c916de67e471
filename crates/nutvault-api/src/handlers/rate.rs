use axum::extract::{Path, State};
use axum::Json;

use crate::auth::BearerWallet;
use crate::dto::RateResponse;
use crate::error_response::AppErrorResponse;
use crate::state::AppState;

/// `GET /rate/:currency` (spec §6).
pub async fn get_rate(
    State(state): State<AppState>,
    BearerWallet(_wallet): BearerWallet,
    Path(currency): Path<String>,
) -> Result<Json<RateResponse>, AppErrorResponse> {
    let rate = state.rate_cache.get_rate(&currency).await?;
    Ok(Json(RateResponse {
        currency: rate.currency.to_string(),
        rate: rate.rate_sats_per_unit,
        timestamp: rate.timestamp_ms,
    }))
}
