//! The proof-lifecycle state machine (spec §4.4): deposit, send, receive,
//! pay, reconcile, and balance, all built on top of [`Store`] and
//! [`MintClient`].

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use nutvault_common::{AppError, CurrencyUnit, ErrorKind, Limits, NewProof, Proof, ProofStatus, Wallet};
use nutvault_mint_client::{
    DecodedToken, MeltQuote, MeltQuoteState, MintClient, MintClientError, MintOperationError,
    MintProofState, MintQuote, MintQuoteState, P2pkLock, ProofStateEntry, SwapOutputConfig,
};
use nutvault_store::Store;

use crate::pubkey::normalize_pubkey;
use crate::wallet_lock::WalletLocks;

/// Result of [`ProofEngine::send_proofs`]: the proofs the wallet keeps and
/// the proofs that make up the bundle the caller exports as a token.
#[derive(Debug, Clone)]
pub struct SendResult {
    pub keep: Vec<Proof>,
    pub send: Vec<Proof>,
}

/// Result of [`ProofEngine::melt_proofs`] once the Lightning payment is
/// confirmed settled, one way or another.
#[derive(Debug, Clone)]
pub struct MeltResult {
    pub quote: MeltQuote,
    pub change: Vec<Proof>,
}

/// Result of [`ProofEngine::reconcile_with_mint`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileCounts {
    pub spent: u64,
    pub unspent: u64,
    pub pending: u64,
}

/// The overall label the facade reports for a checked token (spec §4.4.9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    Unspent,
    Spent,
    Pending,
    Mixed,
}

/// Reduces a token's per-proof mint states to one overall label: uniform
/// states collapse to that state, anything else is `Mixed`.
pub fn aggregate_token_state(states: &[ProofStateEntry]) -> TokenState {
    let mut unspent = 0;
    let mut spent = 0;
    let mut pending = 0;
    for entry in states {
        match entry.state {
            MintProofState::Unspent => unspent += 1,
            MintProofState::Spent => spent += 1,
            MintProofState::Pending => pending += 1,
        }
    }
    let total = states.len();
    if total > 0 && unspent == total {
        TokenState::Unspent
    } else if total > 0 && spent == total {
        TokenState::Spent
    } else if total > 0 && pending == total {
        TokenState::Pending
    } else {
        TokenState::Mixed
    }
}

/// The proof-lifecycle engine. One instance is shared across the process;
/// every mutating operation is serialized per wallet via [`WalletLocks`].
pub struct ProofEngine {
    store: Arc<dyn Store>,
    mint: Arc<dyn MintClient>,
    locks: WalletLocks,
    limits: Limits,
}

impl std::fmt::Debug for ProofEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProofEngine").finish_non_exhaustive()
    }
}

impl ProofEngine {
    pub fn new(store: Arc<dyn Store>, mint: Arc<dyn MintClient>, limits: Limits) -> Self {
        Self { store, mint, locks: WalletLocks::new(), limits }
    }

    fn effective_limits(&self, wallet: &Wallet) -> nutvault_common::EffectiveLimits {
        self.limits.effective(wallet.max_balance, wallet.max_send, wallet.max_pay)
    }

    fn check_unit(&self, wallet: &Wallet, unit: CurrencyUnit) -> Result<(), AppError> {
        if unit != wallet.unit {
            return Err(AppError::validation(format!(
                "unit `{unit}` does not match wallet unit `{}`",
                wallet.unit
            )));
        }
        Ok(())
    }

    /// §4.4.1: pure read of the UNSPENT and PENDING sums.
    pub async fn balance(&self, wallet_id: i64) -> Result<(u64, u64), AppError> {
        let unspent = self.store.aggregate_amount(wallet_id, ProofStatus::Unspent).await?;
        let pending = self.store.aggregate_amount(wallet_id, ProofStatus::Pending).await?;
        Ok((unspent, pending))
    }

    /// §4.4.2: thin pass-through to the mint's bolt11 mint-quote, gated by
    /// the wallet's effective max balance.
    pub async fn create_deposit_quote(
        &self,
        wallet: &Wallet,
        amount: u64,
        unit: CurrencyUnit,
    ) -> Result<MintQuote, AppError> {
        self.check_unit(wallet, unit)?;
        let eff = self.effective_limits(wallet);
        let (balance, _) = self.balance(wallet.id).await?;
        if balance + amount > eff.max_balance {
            return Err(AppError::limit(format!(
                "deposit of {amount} would exceed max balance {}",
                eff.max_balance
            )));
        }
        Ok(self.mint.create_mint_quote(&wallet.mint_url, amount, unit).await?)
    }

    /// §4.4.3: queries the mint; on PAID, opportunistically mints proofs.
    /// Minting failures are logged but never change the response — the
    /// quote check itself always succeeds if the mint was reachable.
    pub async fn check_deposit_quote(&self, wallet: &Wallet, quote_id: &str) -> Result<MintQuote, AppError> {
        let quote = self.mint.check_mint_quote(&wallet.mint_url, quote_id).await?;

        if quote.state == MintQuoteState::Paid {
            let _guard = self.locks.acquire(wallet.id).await;
            match self.mint.mint_proofs(&wallet.mint_url, &quote).await {
                Ok(new_proofs) => {
                    if let Err(err) = self.store.insert_proofs(wallet.id, &new_proofs, ProofStatus::Unspent).await {
                        tracing::warn!(
                            wallet_id = wallet.id,
                            quote = quote_id,
                            error = %err,
                            "failed to persist opportunistically minted proofs"
                        );
                    }
                }
                Err(err) => {
                    tracing::warn!(
                        wallet_id = wallet.id,
                        quote = quote_id,
                        error = %err,
                        "opportunistic mint on deposit check failed; caller can retry"
                    );
                }
            }
        }

        Ok(quote)
    }

    /// §4.4.4: swaps UNSPENT inputs for a `keep`/`send` split, optionally
    /// locking the send side to `p2pk_pubkey` (NUT-11).
    pub async fn send_proofs(
        &self,
        wallet: &Wallet,
        amount: u64,
        p2pk_pubkey: Option<&str>,
    ) -> Result<SendResult, AppError> {
        let eff = self.effective_limits(wallet);
        if amount > eff.max_send {
            return Err(AppError::limit(format!("send amount {amount} exceeds effective max_send {}", eff.max_send)));
        }

        let output_config = match p2pk_pubkey {
            Some(raw) => SwapOutputConfig { send_lock: Some(P2pkLock { pubkey: normalize_pubkey(raw)? }) },
            None => SwapOutputConfig::default(),
        };

        let _guard = self.locks.acquire(wallet.id).await;
        let inputs = self.store.list_proofs(wallet.id, Some(ProofStatus::Unspent)).await?;
        let total: u64 = inputs.iter().map(|p| p.amount).sum();
        if total < amount {
            return Err(AppError::validation("insufficient balance"));
        }

        let outcome = self
            .mint
            .swap(&wallet.mint_url, wallet.unit, &inputs, amount, output_config)
            .await?;
        let persisted = self.persist_swap(wallet.id, &inputs, outcome.keep, outcome.send).await?;
        Ok(SendResult { keep: persisted.0, send: persisted.1 })
    }

    /// §4.4.5: redeems a token's proofs at the mint (a zero-change-side
    /// swap) and inserts the resulting fresh proofs UNSPENT.
    pub async fn receive_token(&self, wallet: &Wallet, token: &str) -> Result<Vec<Proof>, AppError> {
        let decoded = self.decode_token(token)?;
        self.check_unit(wallet, decoded.unit)?;

        let amount: u64 = decoded.proofs.iter().map(|p| p.amount).sum();
        let eff = self.effective_limits(wallet);

        let _guard = self.locks.acquire(wallet.id).await;
        let (balance, _) = self.balance(wallet.id).await?;
        if balance + amount > eff.max_balance {
            return Err(AppError::limit(format!(
                "receiving {amount} would exceed max balance {}",
                eff.max_balance
            )));
        }

        let outcome = self
            .mint
            .swap(&decoded.mint_url, decoded.unit, &decoded.proofs, 0, SwapOutputConfig::default())
            .await?;
        if outcome.keep.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.insert_proofs(wallet.id, &outcome.keep, ProofStatus::Unspent).await?)
    }

    /// Decodes a raw Cashu token without contacting the mint. Exposed so
    /// the facade can size-check a token (e.g. against max_balance) before
    /// deciding to call [`Self::receive_token`].
    pub fn decode_token(&self, token: &str) -> Result<DecodedToken, AppError> {
        Ok(self.mint.decode_token(token)?)
    }

    /// §4.4.6: thin pass-through to the mint's melt quote.
    pub async fn create_melt_quote(&self, wallet: &Wallet, unit: CurrencyUnit, bolt11: &str) -> Result<MeltQuote, AppError> {
        self.check_unit(wallet, unit)?;
        Ok(self.mint.create_melt_quote(&wallet.mint_url, unit, bolt11).await?)
    }

    /// Re-fetches a melt quote's state, for `GET /wallet/pay/:quote`.
    pub async fn check_melt_quote(&self, wallet: &Wallet, quote_id: &str) -> Result<MeltQuote, AppError> {
        Ok(self.mint.check_melt_quote(&wallet.mint_url, quote_id).await?)
    }

    /// §4.4.7: the melt state machine. Phase A reserves proofs via a swap;
    /// Phase B pays the invoice and, on any ambiguous outcome, reclassifies
    /// against the mint's authoritative quote/proof state.
    pub async fn melt_proofs(&self, wallet: &Wallet, quote: MeltQuote) -> Result<MeltResult, AppError> {
        let eff = self.effective_limits(wallet);
        if quote.amount > eff.max_pay {
            return Err(AppError::limit(format!("melt amount {} exceeds effective max_pay {}", quote.amount, eff.max_pay)));
        }
        let needed = quote.amount + quote.fee_reserve;

        let _guard = self.locks.acquire(wallet.id).await;
        let inputs = self.store.list_proofs(wallet.id, Some(ProofStatus::Unspent)).await?;
        let total: u64 = inputs.iter().map(|p| p.amount).sum();
        if total < needed {
            return Err(AppError::validation("insufficient balance"));
        }

        let swap_outcome = self
            .mint
            .swap(&wallet.mint_url, wallet.unit, &inputs, needed, SwapOutputConfig::default())
            .await?;
        let (_keep, reserved) = self.persist_swap(wallet.id, &inputs, swap_outcome.keep, swap_outcome.send).await?;

        match self.mint.melt_proofs(&wallet.mint_url, &quote, &reserved).await {
            Ok(outcome) if outcome.quote.state == MeltQuoteState::Paid => {
                let secrets: Vec<String> = reserved.iter().map(|p| p.secret.clone()).collect();
                self.store.update_status(wallet.id, &secrets, ProofStatus::Spent).await?;
                let change = if outcome.change.is_empty() {
                    Vec::new()
                } else {
                    self.store.insert_proofs(wallet.id, &outcome.change, ProofStatus::Unspent).await?
                };
                Ok(MeltResult { quote: outcome.quote, change })
            }
            Ok(_not_yet_paid) => self.reclassify_melt_failure(wallet, &quote, &reserved, None).await,
            Err(mint_err) => {
                let code = match &mint_err {
                    MintClientError::MintRejected(op) => op.code,
                    _ => None,
                };
                self.reclassify_melt_failure(wallet, &quote, &reserved, code).await
            }
        }
    }

    /// Branches on the mint's authoritative melt-quote state once the
    /// direct payment outcome is ambiguous (spec §4.4.7 table). Assumes
    /// the caller already holds `wallet.id`'s serializing lock.
    async fn reclassify_melt_failure(
        &self,
        wallet: &Wallet,
        quote: &MeltQuote,
        reserved: &[Proof],
        mint_error_code: Option<i32>,
    ) -> Result<MeltResult, AppError> {
        let secrets: Vec<String> = reserved.iter().map(|p| p.secret.clone()).collect();

        let checked = match self.mint.check_melt_quote(&wallet.mint_url, &quote.quote).await {
            Ok(checked) => checked,
            Err(_) => {
                // The re-check itself failed: do not revert. A later
                // reconciliation pass will resolve these proofs.
                return Err(AppError::connection(
                    "could not reach the mint to confirm the melt outcome; reserved proofs remain pending",
                ));
            }
        };

        match checked.state {
            MeltQuoteState::Paid => {
                self.store.update_status(wallet.id, &secrets, ProofStatus::Spent).await?;
                Ok(MeltResult { quote: checked, change: Vec::new() })
            }
            MeltQuoteState::Pending => {
                Err(AppError::timeout_pending("melt payment is still pending at the mint; check back later"))
            }
            MeltQuoteState::Unpaid => {
                if mint_error_code == Some(MintOperationError::PROOFS_PENDING) {
                    self.reconcile_with_mint_locked(wallet).await?;
                    Err(AppError::timeout_pending("proofs are pending at the mint; check back later"))
                } else if mint_error_code == Some(MintOperationError::PROOFS_ALREADY_SPENT) {
                    self.reconcile_with_mint_locked(wallet).await?;
                    Err(AppError::new(ErrorKind::Connection, "reserved proofs were already spent at the mint"))
                } else {
                    self.store.update_status(wallet.id, &secrets, ProofStatus::Unspent).await?;
                    Err(AppError::new(ErrorKind::Connection, "lightning payment did not happen; reserved proofs released"))
                }
            }
        }
    }

    /// §4.4.8: brings PENDING proofs into agreement with the mint's
    /// authoritative view. Safe to call whether or not there is anything
    /// to reconcile (§8 I7).
    pub async fn reconcile_with_mint(&self, wallet: &Wallet) -> Result<ReconcileCounts, AppError> {
        let _guard = self.locks.acquire(wallet.id).await;
        self.reconcile_with_mint_locked(wallet).await
    }

    async fn reconcile_with_mint_locked(&self, wallet: &Wallet) -> Result<ReconcileCounts, AppError> {
        let pending = self.store.list_proofs(wallet.id, Some(ProofStatus::Pending)).await?;
        if pending.is_empty() {
            return Ok(ReconcileCounts::default());
        }

        let states = self.mint.check_proof_states(&wallet.mint_url, &pending).await?;
        let mut spent = Vec::new();
        let mut unspent = Vec::new();
        let mut pending_count = 0u64;
        for entry in states {
            match entry.state {
                MintProofState::Spent => spent.push(entry.secret),
                MintProofState::Unspent => unspent.push(entry.secret),
                MintProofState::Pending => pending_count += 1,
            }
        }

        let counts = ReconcileCounts {
            spent: spent.len() as u64,
            unspent: unspent.len() as u64,
            pending: pending_count,
        };

        if !spent.is_empty() {
            self.store.update_status(wallet.id, &spent, ProofStatus::Spent).await?;
        }
        if !unspent.is_empty() {
            self.store.update_status(wallet.id, &unspent, ProofStatus::Unspent).await?;
        }

        Ok(counts)
    }

    /// §4.4.9: decodes a token and reports the mint's current state for
    /// each of its proofs, for `POST /wallet/check`.
    pub async fn check_token_state(&self, token: &str) -> Result<(Vec<ProofStateEntry>, DecodedToken), AppError> {
        let decoded = self.decode_token(token)?;
        let states = self.mint.check_proof_states(&decoded.mint_url, &decoded.proofs).await?;
        Ok((states, decoded))
    }

    /// Applies a swap's `keep`/`send` split to the store per spec §4.4.4
    /// step 5: inputs absent from both sides were consumed (SPENT); fresh
    /// secrets are inserted at their target status; secrets the mint
    /// returned unchanged (already present in the input set) are
    /// transitioned in place rather than re-inserted (the unique-secret
    /// invariant forbids a second row for the same secret).
    async fn persist_swap(
        &self,
        wallet_id: i64,
        inputs: &[Proof],
        outcome_keep: Vec<NewProof>,
        outcome_send: Vec<NewProof>,
    ) -> Result<(Vec<Proof>, Vec<Proof>), AppError> {
        let by_secret: HashMap<&str, &Proof> = inputs.iter().map(|p| (p.secret.as_str(), p)).collect();
        let returned: HashSet<&str> =
            outcome_keep.iter().chain(&outcome_send).map(|p| p.secret.as_str()).collect();

        let swapped: Vec<String> = inputs
            .iter()
            .filter(|p| !returned.contains(p.secret.as_str()))
            .map(|p| p.secret.clone())
            .collect();
        if !swapped.is_empty() {
            self.store.update_status(wallet_id, &swapped, ProofStatus::Spent).await?;
        }

        let new_keep: Vec<NewProof> =
            outcome_keep.iter().filter(|p| !by_secret.contains_key(p.secret.as_str())).cloned().collect();
        let mut keep_rows = if new_keep.is_empty() {
            Vec::new()
        } else {
            self.store.insert_proofs(wallet_id, &new_keep, ProofStatus::Unspent).await?
        };
        for p in &outcome_keep {
            if let Some(row) = by_secret.get(p.secret.as_str()) {
                keep_rows.push((*row).clone());
            }
        }

        let new_send: Vec<NewProof> =
            outcome_send.iter().filter(|p| !by_secret.contains_key(p.secret.as_str())).cloned().collect();
        let mut send_rows = if new_send.is_empty() {
            Vec::new()
        } else {
            self.store.insert_proofs(wallet_id, &new_send, ProofStatus::Pending).await?
        };

        let reappeared_send: Vec<String> = outcome_send
            .iter()
            .filter(|p| by_secret.contains_key(p.secret.as_str()))
            .map(|p| p.secret.clone())
            .collect();
        if !reappeared_send.is_empty() {
            self.store.update_status(wallet_id, &reappeared_send, ProofStatus::Pending).await?;
            for secret in &reappeared_send {
                if let Some(row) = by_secret.get(secret.as_str()) {
                    let mut row = (*row).clone();
                    row.status = ProofStatus::Pending;
                    send_rows.push(row);
                }
            }
        }

        Ok((keep_rows, send_rows))
    }
}
