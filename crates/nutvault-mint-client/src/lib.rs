mod bolt11;
mod client;
mod error;
mod http;
mod lnurl;
mod payment_request;
mod types;

pub use bolt11::{Bolt11Decoder, DecodedInvoice, LightningInvoiceDecoder};
pub use client::MintClient;
pub use error::{MintClientError, MintClientResult};
pub use http::HttpMintClient;
pub use lnurl::{HttpLnurlResolver, LnurlResolver};
pub use payment_request::{decode_payment_request, DecodedPaymentRequest};
pub use types::{
    DecodedToken, MeltOutcome, MeltQuote, MeltQuoteState, MintOperationError, MintProofState,
    MintQuote, MintQuoteState, P2pkLock, ProofStateEntry, SwapOutcome, SwapOutputConfig,
};

#[cfg(any(test, feature = "test-util"))]
pub mod mock;
