use std::str::FromStr;

use lightning_invoice::Bolt11Invoice;
use serde::Serialize;

use crate::error::{MintClientError, MintClientResult};

/// The pieces of a bolt11 invoice the engine needs to validate a pay
/// request (spec §4.4.6): the amount it demands, if fixed, and when it
/// stops being payable.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedInvoice {
    pub amount_msat: Option<u64>,
    pub expiry_unix: u64,
}

/// Parses bolt11 invoices without contacting anything. Split out as a
/// trait so the engine's pay-request validation can be exercised against a
/// fixed invoice in tests without needing a real one signed on the fly.
pub trait Bolt11Decoder: Send + Sync {
    fn decode(&self, invoice: &str) -> MintClientResult<DecodedInvoice>;
}

#[derive(Debug, Default)]
pub struct LightningInvoiceDecoder;

impl Bolt11Decoder for LightningInvoiceDecoder {
    fn decode(&self, invoice: &str) -> MintClientResult<DecodedInvoice> {
        let parsed = Bolt11Invoice::from_str(invoice)
            .map_err(|e| MintClientError::InvalidInvoice(e.to_string()))?;

        let expiry_unix = parsed
            .expires_at()
            .map(|d| d.as_secs())
            .unwrap_or_else(|| parsed.duration_since_epoch().as_secs() + parsed.expiry_time().as_secs());

        Ok(DecodedInvoice {
            amount_msat: parsed.amount_milli_satoshis(),
            expiry_unix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_input() {
        let decoder = LightningInvoiceDecoder;
        assert!(decoder.decode("not an invoice").is_err());
    }
}
