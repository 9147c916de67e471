use std::str::FromStr;

use cashu::nuts::nut18::PaymentRequest as CashuPaymentRequest;
use nutvault_common::CurrencyUnit;
use serde::Serialize;

use crate::error::{MintClientError, MintClientResult};

/// A decoded NUT-18 Cashu payment request (`creqA...`). Decode-only: the
/// engine never executes a payment request, it just reports what one asks
/// for (spec §6 `/wallet/decode`, type `CASHU_REQUEST`).
#[derive(Debug, Clone, Serialize)]
pub struct DecodedPaymentRequest {
    pub payment_id: Option<String>,
    pub amount: Option<u64>,
    pub unit: Option<CurrencyUnit>,
    pub single_use: bool,
    pub mints: Vec<String>,
    pub description: Option<String>,
}

/// Parses a `creqA...`-encoded payment request without contacting anything.
pub fn decode_payment_request(raw: &str) -> MintClientResult<DecodedPaymentRequest> {
    let parsed = CashuPaymentRequest::from_str(raw.trim())
        .map_err(|e| MintClientError::Decode(format!("invalid cashu payment request: {e}")))?;

    Ok(DecodedPaymentRequest {
        payment_id: parsed.payment_id,
        amount: parsed.amount.map(u64::from),
        unit: parsed.unit.and_then(|u| u.to_string().parse::<CurrencyUnit>().ok()),
        single_use: parsed.single_use.unwrap_or(false),
        mints: parsed.mints.unwrap_or_default().iter().map(|m| m.to_string()).collect(),
        description: parsed.description,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_prefix() {
        assert!(decode_payment_request("notacreq").is_err());
    }
}
