//! An in-memory stand-in for [`MintClient`], used by `nutvault-engine`'s
//! tests so the proof-lifecycle state machine can be exercised without a
//! live mint. Mirrors the shape of `cdk-fake-wallet`: canned, scriptable
//! responses behind a tokio mutex rather than a real Lightning backend.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use nutvault_common::{CurrencyUnit, NewProof, Proof};

use crate::client::MintClient;
use crate::error::{MintClientError, MintClientResult};
use crate::types::{
    DecodedToken, MeltOutcome, MeltQuote, MeltQuoteState, MintProofState, MintQuote,
    MintQuoteState, ProofStateEntry, SwapOutcome, SwapOutputConfig,
};

/// Scripted [`MintClient`] double.
///
/// Quote state and proof state are pre-seeded by the test; `swap`/
/// `mint_proofs`/`melt_proofs` fabricate proofs with sequential secrets
/// rather than real blind signatures, since engine tests only need to
/// assert on amounts and status transitions, not cryptographic validity.
pub struct MockMintClient {
    mint_quotes: Mutex<HashMap<String, MintQuote>>,
    melt_quotes: Mutex<HashMap<String, MeltQuote>>,
    melt_errors: Mutex<HashMap<String, crate::types::MintOperationError>>,
    proof_states: Mutex<HashMap<String, MintProofState>>,
    default_proof_state: Mutex<MintProofState>,
    decoded_tokens: Mutex<HashMap<String, DecodedToken>>,
    next_id: AtomicU64,
}

impl Default for MockMintClient {
    fn default() -> Self {
        Self {
            mint_quotes: Mutex::new(HashMap::new()),
            melt_quotes: Mutex::new(HashMap::new()),
            melt_errors: Mutex::new(HashMap::new()),
            proof_states: Mutex::new(HashMap::new()),
            default_proof_state: Mutex::new(MintProofState::Unspent),
            decoded_tokens: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl MockMintClient {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh_secret(&self) -> String {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        format!("mock-secret-{id}")
    }

    fn fabricate(&self, amounts: impl IntoIterator<Item = u64>) -> Vec<NewProof> {
        amounts
            .into_iter()
            .map(|amount| NewProof {
                proof_id: "mock-keyset".to_string(),
                amount,
                secret: self.fresh_secret(),
                c: "mock-c".to_string(),
                dleq: None,
                witness: None,
            })
            .collect()
    }

    pub fn seed_mint_quote(&self, quote: MintQuote) {
        self.mint_quotes.lock().expect("mock mutex poisoned").insert(quote.quote.clone(), quote);
    }

    pub fn seed_melt_quote(&self, quote: MeltQuote) {
        self.melt_quotes.lock().expect("mock mutex poisoned").insert(quote.quote.clone(), quote);
    }

    pub fn set_mint_quote_state(&self, quote: &str, state: MintQuoteState) {
        if let Some(q) = self.mint_quotes.lock().expect("mock mutex poisoned").get_mut(quote) {
            q.state = state;
        }
    }

    pub fn set_melt_quote_state(&self, quote: &str, state: MeltQuoteState) {
        if let Some(q) = self.melt_quotes.lock().expect("mock mutex poisoned").get_mut(quote) {
            q.state = state;
        }
    }

    pub fn set_proof_state(&self, secret: &str, state: MintProofState) {
        self.proof_states
            .lock()
            .expect("mock mutex poisoned")
            .insert(secret.to_string(), state);
    }

    /// Overrides the state `check_proof_states` reports for secrets that
    /// were never individually seeded via [`Self::set_proof_state`] (e.g.
    /// proofs fabricated by `swap`/`melt_proofs` whose secrets the caller
    /// doesn't control). Defaults to `Unspent`.
    pub fn set_default_proof_state(&self, state: MintProofState) {
        *self.default_proof_state.lock().expect("mock mutex poisoned") = state;
    }

    /// Forces the next `melt_proofs` call against `quote` to fail with the
    /// given mint error, instead of echoing the quote back unchanged.
    pub fn seed_melt_error(&self, quote: &str, error: crate::types::MintOperationError) {
        self.melt_errors.lock().expect("mock mutex poisoned").insert(quote.to_string(), error);
    }

    pub fn seed_decoded_token(&self, raw: &str, decoded: DecodedToken) {
        self.decoded_tokens
            .lock()
            .expect("mock mutex poisoned")
            .insert(raw.to_string(), decoded);
    }
}

#[async_trait]
impl MintClient for MockMintClient {
    async fn create_mint_quote(
        &self,
        _mint_url: &str,
        amount: u64,
        unit: CurrencyUnit,
    ) -> MintClientResult<MintQuote> {
        let quote = MintQuote {
            quote: format!("mint-quote-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            request: "lnbc1mockinvoice".to_string(),
            amount,
            unit,
            state: MintQuoteState::Unpaid,
            expiry: i64::MAX as u64,
        };
        self.seed_mint_quote(quote.clone());
        Ok(quote)
    }

    async fn check_mint_quote(&self, _mint_url: &str, quote: &str) -> MintClientResult<MintQuote> {
        self.mint_quotes
            .lock()
            .expect("mock mutex poisoned")
            .get(quote)
            .cloned()
            .ok_or_else(|| MintClientError::QuoteNotFound(quote.to_string()))
    }

    async fn mint_proofs(&self, _mint_url: &str, quote: &MintQuote) -> MintClientResult<Vec<NewProof>> {
        if quote.state != MintQuoteState::Paid {
            return Err(MintClientError::MintRejected(crate::types::MintOperationError {
                code: None,
                message: "quote is not paid".to_string(),
            }));
        }
        let amounts = cashu::Amount::from(quote.amount).split().into_iter().map(u64::from);
        Ok(self.fabricate(amounts))
    }

    async fn swap(
        &self,
        _mint_url: &str,
        _unit: CurrencyUnit,
        input_proofs: &[Proof],
        send_amount: u64,
        _output_config: SwapOutputConfig,
    ) -> MintClientResult<SwapOutcome> {
        let total: u64 = input_proofs.iter().map(|p| p.amount).sum();
        let keep_amount = total
            .checked_sub(send_amount)
            .ok_or_else(|| MintClientError::Decode("send amount exceeds inputs".to_string()))?;

        let keep = self.fabricate(cashu::Amount::from(keep_amount).split().into_iter().map(u64::from));
        let send = self.fabricate(cashu::Amount::from(send_amount).split().into_iter().map(u64::from));
        Ok(SwapOutcome { keep, send })
    }

    async fn create_melt_quote(
        &self,
        _mint_url: &str,
        unit: CurrencyUnit,
        _invoice: &str,
    ) -> MintClientResult<MeltQuote> {
        let quote = MeltQuote {
            quote: format!("melt-quote-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            amount: 0,
            fee_reserve: 0,
            unit,
            state: MeltQuoteState::Unpaid,
            expiry: i64::MAX as u64,
            payment_preimage: None,
        };
        self.seed_melt_quote(quote.clone());
        Ok(quote)
    }

    async fn check_melt_quote(&self, _mint_url: &str, quote: &str) -> MintClientResult<MeltQuote> {
        self.melt_quotes
            .lock()
            .expect("mock mutex poisoned")
            .get(quote)
            .cloned()
            .ok_or_else(|| MintClientError::QuoteNotFound(quote.to_string()))
    }

    async fn melt_proofs(
        &self,
        _mint_url: &str,
        quote: &MeltQuote,
        _input_proofs: &[Proof],
    ) -> MintClientResult<MeltOutcome> {
        if let Some(error) = self.melt_errors.lock().expect("mock mutex poisoned").remove(&quote.quote) {
            return Err(MintClientError::MintRejected(error));
        }
        Ok(MeltOutcome {
            quote: quote.clone(),
            change: Vec::new(),
        })
    }

    async fn check_proof_states(
        &self,
        _mint_url: &str,
        proofs: &[Proof],
    ) -> MintClientResult<Vec<ProofStateEntry>> {
        let states = self.proof_states.lock().expect("mock mutex poisoned");
        let default_state = *self.default_proof_state.lock().expect("mock mutex poisoned");
        Ok(proofs
            .iter()
            .map(|p| ProofStateEntry {
                secret: p.secret.clone(),
                state: states.get(&p.secret).copied().unwrap_or(default_state),
            })
            .collect())
    }

    fn decode_token(&self, token: &str) -> MintClientResult<DecodedToken> {
        self.decoded_tokens
            .lock()
            .expect("mock mutex poisoned")
            .get(token)
            .cloned()
            .ok_or_else(|| MintClientError::Decode(format!("no seeded decode for `{token}`")))
    }

    async fn resolve_lightning_address(&self, address: &str, _amount_msat: u64) -> MintClientResult<String> {
        Ok(format!("lnbc1mockinvoice-for-{address}"))
    }

    fn encode_token(
        &self,
        mint_url: &str,
        _unit: CurrencyUnit,
        proofs: &[Proof],
        _memo: Option<&str>,
    ) -> MintClientResult<String> {
        let secrets: Vec<&str> = proofs.iter().map(|p| p.secret.as_str()).collect();
        Ok(format!("mock-token-{mint_url}-{}", secrets.join(",")))
    }
}
