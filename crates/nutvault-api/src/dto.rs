//! Request/response shapes for the `/v1` HTTP API (spec §6). Deliberately
//! flat DTOs distinct from the domain types in `nutvault-common`/
//! `nutvault-mint-client`; handlers translate between the two explicitly.

use nutvault_common::CurrencyUnit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct InfoLimits {
    pub max_balance: u64,
    pub max_send: u64,
    pub max_pay: u64,
    pub rate_limit_max: u32,
    pub rate_limit_create_wallet_max: u32,
    pub rate_limit_window_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct InfoResponse {
    pub status: String,
    pub help: String,
    pub terms: String,
    pub unit: CurrencyUnit,
    pub mint: String,
    pub limits: InfoLimits,
}

#[derive(Debug, Deserialize)]
pub struct CreateWalletRequest {
    pub name: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WalletResponse {
    pub name: Option<String>,
    pub access_key: String,
    pub mint: String,
    pub unit: CurrencyUnit,
    pub balance: u64,
    pub pending_balance: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limits: Option<WalletLimitsResponse>,
}

#[derive(Debug, Serialize)]
pub struct WalletLimitsResponse {
    pub max_balance: u64,
    pub max_send: u64,
    pub max_pay: u64,
}

#[derive(Debug, Deserialize)]
pub struct DepositRequest {
    pub amount: u64,
    pub unit: CurrencyUnit,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub quote: String,
    pub request: String,
    pub state: String,
    pub expiry: u64,
}

#[derive(Debug, Deserialize)]
pub struct SendRequest {
    pub amount: u64,
    pub unit: CurrencyUnit,
    pub memo: Option<String>,
    pub lock_to_pubkey: Option<String>,
    pub cashu_request: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendResponse {
    pub token: String,
    pub amount: u64,
    pub unit: CurrencyUnit,
    pub memo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct ProofStateEntryResponse {
    pub secret: String,
    pub state: String,
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub amount: u64,
    pub unit: CurrencyUnit,
    pub memo: Option<String>,
    pub state: String,
    pub mint_proof_states: Vec<ProofStateEntryResponse>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum DecodeType {
    #[serde(rename = "CASHU_TOKEN_V3")]
    CashuTokenV3,
    #[serde(rename = "CASHU_TOKEN_V4")]
    CashuTokenV4,
    #[serde(rename = "BOLT11_REQUEST")]
    Bolt11Request,
    #[serde(rename = "CASHU_REQUEST")]
    CashuRequest,
}

#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    #[serde(rename = "type")]
    pub kind: DecodeType,
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct DecodeResponse {
    #[serde(rename = "type")]
    pub kind: String,
    pub decoded: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct PayRequest {
    pub bolt11_request: Option<String>,
    pub lightning_address: Option<String>,
    pub amount: u64,
    pub unit: CurrencyUnit,
}

#[derive(Debug, Serialize)]
pub struct PayResponse {
    pub quote: String,
    pub amount: u64,
    pub fee_reserve: u64,
    pub state: String,
    pub payment_preimage: Option<String>,
    pub expiry: u64,
}

#[derive(Debug, Serialize)]
pub struct ReceiveResponse {
    pub amount: u64,
    pub unit: CurrencyUnit,
    pub balance: u64,
    pub pending_balance: u64,
}

#[derive(Debug, Serialize)]
pub struct RateResponse {
    pub currency: String,
    pub rate: f64,
    pub timestamp: u64,
}
