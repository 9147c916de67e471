use nutvault_common::AppError;

use crate::pool::PoolError;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database pool error: {0}")]
    Pool(#[from] PoolError),

    #[error("database error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    #[error("wallet {0} not found")]
    WalletNotFound(i64),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::WalletNotFound(id) => AppError::not_found(format!("wallet {id} not found")),
            other => AppError::database(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
