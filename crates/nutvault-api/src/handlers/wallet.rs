//! `/v1/wallet*` routes (spec §6): wallet lifecycle, deposit, send/receive,
//! pay, and the decode helper. Every handler here except [`create_wallet`]
//! runs behind the [`crate::auth::BearerWallet`] extractor.

use axum::extract::{Path, State};
use axum::Json;
use nutvault_common::AppError;
use nutvault_engine::aggregate_token_state;
use rand::RngCore;

use crate::auth::BearerWallet;
use crate::dto::{
    CheckResponse, CreateWalletRequest, DecodeRequest, DecodeResponse, DecodeType, DepositRequest,
    PayRequest, PayResponse, ProofStateEntryResponse, QuoteResponse, ReceiveResponse, SendRequest,
    SendResponse, TokenRequest, WalletLimitsResponse, WalletResponse,
};
use crate::error_response::AppErrorResponse;
use crate::state::AppState;

fn require_positive(amount: u64) -> Result<(), AppError> {
    if amount == 0 {
        return Err(AppError::validation("amount must be greater than zero"));
    }
    Ok(())
}

fn generate_access_key() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Builds the `/wallet` response shape. `with_limits` is false for
/// `POST /wallet` (spec §6 lists no `limits` field on that response) and
/// true for `GET /wallet`.
async fn wallet_response(
    state: &AppState,
    wallet: &nutvault_common::Wallet,
    with_limits: bool,
) -> Result<WalletResponse, AppErrorResponse> {
    let (balance, pending_balance) = state.engine.balance(wallet.id).await?;
    let limits = with_limits.then(|| {
        let eff = state.config.limits.effective(wallet.max_balance, wallet.max_send, wallet.max_pay);
        WalletLimitsResponse { max_balance: eff.max_balance, max_send: eff.max_send, max_pay: eff.max_pay }
    });

    Ok(WalletResponse {
        name: wallet.name.clone(),
        access_key: wallet.access_key.clone(),
        mint: wallet.mint_url.clone(),
        unit: wallet.unit,
        balance,
        pending_balance,
        limits,
    })
}

/// `POST /wallet` (spec §6) — public, `RATE_LIMIT_CREATE_WALLET_MAX`-guarded.
/// Creates a wallet and, if `token` is given, redeems it in the same call;
/// a redeem failure rolls the new wallet back rather than leaving an empty
/// one behind.
pub async fn create_wallet(
    State(state): State<AppState>,
    Json(req): Json<CreateWalletRequest>,
) -> Result<Json<WalletResponse>, AppErrorResponse> {
    let access_key = generate_access_key();
    let wallet = state
        .store
        .create_wallet(&access_key, req.name.as_deref(), &state.config.mint_url, state.config.unit, Default::default())
        .await?;

    if let Some(token) = req.token.as_deref() {
        if let Err(err) = state.engine.receive_token(&wallet, token).await {
            let _ = state.store.delete_proofs_by_wallet(wallet.id).await;
            let _ = state.store.delete_wallet(wallet.id).await;
            return Err(err.into());
        }
    }

    Ok(Json(wallet_response(&state, &wallet, false).await?))
}

/// `GET /wallet` (spec §6).
pub async fn get_wallet(
    State(state): State<AppState>,
    BearerWallet(wallet): BearerWallet,
) -> Result<Json<WalletResponse>, AppErrorResponse> {
    Ok(Json(wallet_response(&state, &wallet, true).await?))
}

/// `POST /wallet/deposit` (spec §6).
pub async fn deposit(
    State(state): State<AppState>,
    BearerWallet(wallet): BearerWallet,
    Json(req): Json<DepositRequest>,
) -> Result<Json<QuoteResponse>, AppErrorResponse> {
    require_positive(req.amount)?;
    let quote = state.engine.create_deposit_quote(&wallet, req.amount, req.unit).await?;
    Ok(Json(QuoteResponse {
        quote: quote.quote,
        request: quote.request,
        state: quote.state.to_string(),
        expiry: quote.expiry,
    }))
}

/// `GET /wallet/deposit/:quote` (spec §6).
pub async fn check_deposit_quote(
    State(state): State<AppState>,
    BearerWallet(wallet): BearerWallet,
    Path(quote_id): Path<String>,
) -> Result<Json<QuoteResponse>, AppErrorResponse> {
    let quote = state.engine.check_deposit_quote(&wallet, &quote_id).await?;
    Ok(Json(QuoteResponse {
        quote: quote.quote,
        request: quote.request,
        state: quote.state.to_string(),
        expiry: quote.expiry,
    }))
}

/// `POST /wallet/send` (spec §6). `cashu_request` is accepted on the wire
/// but never honored: this service only ever hands back a bearer token,
/// never initiates a NUT-18 payment to a third-party request.
pub async fn send(
    State(state): State<AppState>,
    BearerWallet(wallet): BearerWallet,
    Json(req): Json<SendRequest>,
) -> Result<Json<SendResponse>, AppErrorResponse> {
    require_positive(req.amount)?;
    if req.unit != wallet.unit {
        return Err(AppError::validation(format!(
            "unit `{}` does not match wallet unit `{}`",
            req.unit, wallet.unit
        ))
        .into());
    }
    if req.cashu_request.is_some() {
        return Err(AppError::validation("cashu_request is not supported by this service").into());
    }

    let result = state.engine.send_proofs(&wallet, req.amount, req.lock_to_pubkey.as_deref()).await?;
    let token = state.mint.encode_token(&wallet.mint_url, wallet.unit, &result.send, req.memo.as_deref())?;

    Ok(Json(SendResponse { token, amount: req.amount, unit: wallet.unit, memo: req.memo }))
}

/// `POST /wallet/check` (spec §6). Reports the mint's authoritative state
/// for a token's proofs and, as a side effect, reconciles this wallet's own
/// PENDING rows against the mint so the check also clears any stale
/// PENDING left over from an earlier send or melt.
pub async fn check(
    State(state): State<AppState>,
    BearerWallet(wallet): BearerWallet,
    Json(req): Json<TokenRequest>,
) -> Result<Json<CheckResponse>, AppErrorResponse> {
    let (states, decoded) = state.engine.check_token_state(&req.token).await?;
    let _ = state.engine.reconcile_with_mint(&wallet).await;

    let amount: u64 = decoded.proofs.iter().map(|p| p.amount).sum();
    let overall = aggregate_token_state(&states);
    let overall = match overall {
        nutvault_engine::TokenState::Unspent => "UNSPENT",
        nutvault_engine::TokenState::Spent => "SPENT",
        nutvault_engine::TokenState::Pending => "PENDING",
        nutvault_engine::TokenState::Mixed => "MIXED",
    };

    Ok(Json(CheckResponse {
        amount,
        unit: decoded.unit,
        memo: decoded.memo,
        state: overall.to_string(),
        mint_proof_states: states
            .into_iter()
            .map(|e| ProofStateEntryResponse { secret: e.secret, state: e.state.to_string() })
            .collect(),
    }))
}

/// `POST /wallet/decode` (spec §6). Pure local parsing; never contacts the
/// mint or a remote LNURL endpoint.
pub async fn decode(
    State(state): State<AppState>,
    BearerWallet(_wallet): BearerWallet,
    Json(req): Json<DecodeRequest>,
) -> Result<Json<DecodeResponse>, AppErrorResponse> {
    let (kind, decoded) = match req.kind {
        DecodeType::CashuTokenV3 => {
            let token = state.mint.decode_token(&req.data)?;
            ("CASHU_TOKEN_V3", serde_json::to_value(token).map_err(|e| AppError::unknown(e.to_string()))?)
        }
        DecodeType::CashuTokenV4 => {
            let token = state.mint.decode_token(&req.data)?;
            ("CASHU_TOKEN_V4", serde_json::to_value(token).map_err(|e| AppError::unknown(e.to_string()))?)
        }
        DecodeType::Bolt11Request => {
            let invoice = state.bolt11.decode(&req.data)?;
            ("BOLT11_REQUEST", serde_json::to_value(invoice).map_err(|e| AppError::unknown(e.to_string()))?)
        }
        DecodeType::CashuRequest => {
            let payment_request = nutvault_mint_client::decode_payment_request(&req.data)?;
            ("CASHU_REQUEST", serde_json::to_value(payment_request).map_err(|e| AppError::unknown(e.to_string()))?)
        }
    };

    Ok(Json(DecodeResponse { kind: kind.to_string(), decoded }))
}

/// `POST /wallet/pay` (spec §6). `lightning_address` takes priority: when
/// present it is resolved to a bolt11 invoice before a melt quote is ever
/// requested, so `amount`/`unit` drive the resolved invoice's value.
pub async fn pay(
    State(state): State<AppState>,
    BearerWallet(wallet): BearerWallet,
    Json(req): Json<PayRequest>,
) -> Result<Json<PayResponse>, AppErrorResponse> {
    require_positive(req.amount)?;

    let amount_msat = match req.unit {
        nutvault_common::CurrencyUnit::Sat => req.amount.saturating_mul(1000),
        nutvault_common::CurrencyUnit::Msat => req.amount,
    };

    let bolt11 = match req.lightning_address.as_deref() {
        Some(address) => state.mint.resolve_lightning_address(address, amount_msat).await?,
        None => req
            .bolt11_request
            .clone()
            .ok_or_else(|| AppError::validation("either bolt11_request or lightning_address is required"))?,
    };

    let quote = state.engine.create_melt_quote(&wallet, req.unit, &bolt11).await?;
    let result = state.engine.melt_proofs(&wallet, quote).await?;

    Ok(Json(PayResponse {
        quote: result.quote.quote,
        amount: result.quote.amount,
        fee_reserve: result.quote.fee_reserve,
        state: result.quote.state.to_string(),
        payment_preimage: result.quote.payment_preimage,
        expiry: result.quote.expiry,
    }))
}

/// `GET /wallet/pay/:quote` (spec §6).
pub async fn check_melt_quote(
    State(state): State<AppState>,
    BearerWallet(wallet): BearerWallet,
    Path(quote_id): Path<String>,
) -> Result<Json<PayResponse>, AppErrorResponse> {
    let quote = state.engine.check_melt_quote(&wallet, &quote_id).await?;
    Ok(Json(PayResponse {
        quote: quote.quote,
        amount: quote.amount,
        fee_reserve: quote.fee_reserve,
        state: quote.state.to_string(),
        payment_preimage: quote.payment_preimage,
        expiry: quote.expiry,
    }))
}

/// `POST /wallet/receive` (spec §6).
pub async fn receive(
    State(state): State<AppState>,
    BearerWallet(wallet): BearerWallet,
    Json(req): Json<TokenRequest>,
) -> Result<Json<ReceiveResponse>, AppErrorResponse> {
    let received = state.engine.receive_token(&wallet, &req.token).await?;
    let amount: u64 = received.iter().map(|p| p.amount).sum();
    let (balance, pending_balance) = state.engine.balance(wallet.id).await?;

    Ok(Json(ReceiveResponse { amount, unit: wallet.unit, balance, pending_balance }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_amount() {
        let err = require_positive(0).unwrap_err();
        assert_eq!(err.kind, nutvault_common::ErrorKind::Validation);
    }

    #[test]
    fn accepts_positive_amount() {
        assert!(require_positive(1).is_ok());
    }

    #[test]
    fn access_keys_are_64_hex_chars_and_distinct() {
        let a = generate_access_key();
        let b = generate_access_key();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
