mod error;
mod pool;
mod postgres;
mod store;

pub use error::{StoreError, StoreResult};
pub use postgres::PostgresStore;
pub use store::{Store, WalletLimits};

#[cfg(any(test, feature = "test-util"))]
pub mod mock;
