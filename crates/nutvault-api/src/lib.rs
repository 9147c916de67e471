//! The HTTP facade (spec §4.6/§6): bearer-wallet auth, per-IP rate
//! limiting, request-shape validation, and the `/v1` routes, built on top
//! of `nutvault-engine`, `nutvault-store`, and `nutvault-mint-client`.

mod auth;
mod config;
mod dto;
mod error_response;
mod handlers;
mod rate_limit;
mod router;
mod state;

pub use config::ApiConfig;
pub use error_response::AppErrorResponse;
pub use rate_limit::RateLimiter;
pub use router::build_router;
pub use state::AppState;
