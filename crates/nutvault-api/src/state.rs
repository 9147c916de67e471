use std::sync::Arc;

use nutvault_engine::{ProofEngine, RateCache};
use nutvault_mint_client::{Bolt11Decoder, MintClient};
use nutvault_store::Store;

use crate::config::ApiConfig;
use crate::rate_limit::RateLimiter;

/// Shared, `Clone`-cheap handle every handler extracts via `State`. All
/// fields are already `Arc`-wrapped collaborators (spec §5: the mint client
/// and rate cache are process-wide, the store is shared across all tasks).
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ProofEngine>,
    pub store: Arc<dyn Store>,
    pub mint: Arc<dyn MintClient>,
    pub rate_cache: Arc<RateCache>,
    pub bolt11: Arc<dyn Bolt11Decoder>,
    pub config: Arc<ApiConfig>,
    pub create_wallet_limiter: Arc<RateLimiter>,
    pub mutating_limiter: Arc<RateLimiter>,
}
