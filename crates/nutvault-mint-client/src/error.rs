use nutvault_common::{AppError, ErrorKind};

use crate::types::MintOperationError;

/// Error surface of the `MintClient` trait. Kept distinct from `AppError`
/// so collaborators (bolt11, lnurl, http) can be tested without pulling in
/// the facade's status-code concerns; `From<MintClientError> for AppError`
/// does that translation once, at the engine boundary.
#[derive(Debug, thiserror::Error)]
pub enum MintClientError {
    #[error("could not reach mint: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("mint returned malformed data: {0}")]
    Decode(String),

    #[error(transparent)]
    MintRejected(#[from] MintOperationError),

    #[error("invalid bolt11 invoice: {0}")]
    InvalidInvoice(String),

    #[error("could not resolve lightning address: {0}")]
    LnurlResolution(String),

    #[error("mint quote or melt quote not found: {0}")]
    QuoteNotFound(String),
}

impl From<MintClientError> for AppError {
    fn from(err: MintClientError) -> Self {
        match &err {
            MintClientError::Connection(_) => AppError::connection(err.to_string()),
            MintClientError::Decode(_) => AppError::new(ErrorKind::Server, err.to_string()),
            MintClientError::MintRejected(inner) => {
                if inner.is_code(MintOperationError::PROOFS_ALREADY_SPENT) {
                    AppError::new(ErrorKind::AlreadyExists, err.to_string())
                } else if inner.is_code(MintOperationError::PROOFS_PENDING) {
                    AppError::new(ErrorKind::Timeout, err.to_string())
                } else {
                    AppError::new(ErrorKind::Server, err.to_string())
                }
            }
            MintClientError::InvalidInvoice(_) => AppError::validation(err.to_string()),
            MintClientError::LnurlResolution(_) => AppError::validation(err.to_string()),
            MintClientError::QuoteNotFound(_) => AppError::not_found(err.to_string()),
        }
    }
}

pub type MintClientResult<T> = Result<T, MintClientError>;
