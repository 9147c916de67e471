//! Shared domain types and error taxonomy for the NutVault custodial wallet.
//!
//! This crate has no knowledge of HTTP, SQL, or the mint wire protocol; it is
//! the vocabulary every other `nutvault-*` crate shares.

mod error;
mod limits;
mod model;

pub use error::{AppError, ErrorKind};
pub use limits::{EffectiveLimits, Limits};
pub use model::{CurrencyUnit, NewProof, Proof, ProofStatus, Wallet};
