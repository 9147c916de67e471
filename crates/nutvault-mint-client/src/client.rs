use async_trait::async_trait;
use nutvault_common::{CurrencyUnit, NewProof, Proof};

use crate::error::MintClientResult;
use crate::types::{
    DecodedToken, MeltOutcome, MeltQuote, MintQuote, ProofStateEntry, SwapOutcome,
    SwapOutputConfig,
};

/// The mint's Cashu-over-HTTP surface, reduced to the primitives the engine
/// needs (spec §4.4). Every method is a single round trip to the mint (or,
/// for `decode_token`/`resolve_lightning_address`, pure local parsing); the
/// engine owns composing them into multi-step operations and persisting the
/// results.
#[async_trait]
pub trait MintClient: Send + Sync {
    /// Request a bolt11 invoice from the mint for `amount` of `unit`.
    async fn create_mint_quote(
        &self,
        mint_url: &str,
        amount: u64,
        unit: CurrencyUnit,
    ) -> MintClientResult<MintQuote>;

    /// Re-fetch a mint quote's current state. The mint's check endpoint
    /// does not echo `amount`/`unit` back, so callers should keep using the
    /// values from the original `create_mint_quote` call and only trust
    /// `state`/`expiry` on the returned quote.
    async fn check_mint_quote(&self, mint_url: &str, quote: &str) -> MintClientResult<MintQuote>;

    /// Exchange a paid mint quote for freshly blind-signed proofs.
    async fn mint_proofs(
        &self,
        mint_url: &str,
        quote: &MintQuote,
    ) -> MintClientResult<Vec<NewProof>>;

    /// Swap `input_proofs` for a fresh set of proofs split according to
    /// `output_config`, returning the `keep` and `send` partitions.
    async fn swap(
        &self,
        mint_url: &str,
        unit: CurrencyUnit,
        input_proofs: &[Proof],
        send_amount: u64,
        output_config: SwapOutputConfig,
    ) -> MintClientResult<SwapOutcome>;

    /// Request a melt quote for paying `invoice` out of `unit`-denominated
    /// proofs.
    async fn create_melt_quote(
        &self,
        mint_url: &str,
        unit: CurrencyUnit,
        invoice: &str,
    ) -> MintClientResult<MeltQuote>;

    /// Re-fetch a melt quote's current state. As with `check_mint_quote`,
    /// trust only `state`/`expiry`/`payment_preimage` on the result.
    async fn check_melt_quote(&self, mint_url: &str, quote: &str) -> MintClientResult<MeltQuote>;

    /// Present `input_proofs` against a melt quote, settling the Lightning
    /// payment. Returns the quote's final state plus any overpaid change.
    async fn melt_proofs(
        &self,
        mint_url: &str,
        quote: &MeltQuote,
        input_proofs: &[Proof],
    ) -> MintClientResult<MeltOutcome>;

    /// Ask the mint for the current UNSPENT/PENDING/SPENT state of each
    /// proof, keyed by `secret` (NUT-07).
    async fn check_proof_states(
        &self,
        mint_url: &str,
        proofs: &[Proof],
    ) -> MintClientResult<Vec<ProofStateEntry>>;

    /// Parse a raw Cashu token string (v3 or v4) into mint, unit, and
    /// proofs, without contacting the mint.
    fn decode_token(&self, token: &str) -> MintClientResult<DecodedToken>;

    /// Encode `proofs` as a v3 (`cashuA...`) Cashu token, without contacting
    /// the mint. The inverse of `decode_token` for the send/receive paths.
    fn encode_token(
        &self,
        mint_url: &str,
        unit: CurrencyUnit,
        proofs: &[Proof],
        memo: Option<&str>,
    ) -> MintClientResult<String>;

    /// Resolve a `user@host` Lightning address to a bolt11 invoice for
    /// `amount_msat`, per LNURL-pay (spec §6).
    async fn resolve_lightning_address(
        &self,
        address: &str,
        amount_msat: u64,
    ) -> MintClientResult<String>;
}
