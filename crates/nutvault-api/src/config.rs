//! Values the facade needs once it is already running. Reading these out of
//! the environment is `nutvault-server`'s job (spec §4.7); this crate only
//! carries the already-resolved values so it stays testable without `std::env`.

use std::time::Duration;

use nutvault_common::{CurrencyUnit, Limits};

/// Everything `GET /info` reports plus the two rate-limit knobs the
/// middleware enforces.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub service_status: String,
    pub service_help: String,
    pub service_terms: String,
    pub mint_url: String,
    pub unit: CurrencyUnit,
    pub limits: Limits,
    pub rate_limit_max: u32,
    pub rate_limit_create_wallet_max: u32,
    pub rate_limit_window: Duration,
}
