//! The proof-lifecycle engine: normalizes pubkeys, caches BTC/fiat rates,
//! serializes per-wallet mutations, and drives the deposit/send/receive/pay
//! state machine on top of `nutvault-store` and `nutvault-mint-client`.

mod engine;
mod pubkey;
mod rate_cache;
mod wallet_lock;

pub use engine::{aggregate_token_state, MeltResult, ProofEngine, ReconcileCounts, SendResult, TokenState};
pub use pubkey::normalize_pubkey;
pub use rate_cache::{HttpPriceOracle, PriceOracle, Rate, RateCache, SUPPORTED_CURRENCIES};
pub use wallet_lock::WalletLocks;

#[cfg(test)]
mod tests;
