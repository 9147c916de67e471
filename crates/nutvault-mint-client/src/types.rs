use nutvault_common::{CurrencyUnit, NewProof, Proof};
use serde::{Deserialize, Serialize};

/// State of a bolt11 mint quote, as reported by `checkMintQuote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MintQuoteState {
    Unpaid,
    Paid,
    Issued,
}

/// A commitment to issue proofs of `amount` once `request` (a bolt11
/// invoice) is paid.
#[derive(Debug, Clone, Serialize, Deserialize)]
impl std::fmt::Display for MintQuoteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MintQuoteState::Unpaid => "UNPAID",
            MintQuoteState::Paid => "PAID",
            MintQuoteState::Issued => "ISSUED",
        };
        f.write_str(s)
    }
}

pub struct MintQuote {
    pub quote: String,
    pub request: String,
    pub amount: u64,
    pub unit: CurrencyUnit,
    pub state: MintQuoteState,
    pub expiry: u64,
}

/// State of a melt quote. Unlike [`MintQuoteState`] this has a `Pending`
/// variant: the mint uses it to report a Lightning payment that is still in
/// flight, which the melt path (spec §4.4.7) must distinguish from a
/// definite failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MeltQuoteState {
    Unpaid,
    Pending,
    Paid,
}

/// A commitment to pay a bolt11 invoice once `amount + fee_reserve` worth of
/// proofs are presented.
#[derive(Debug, Clone, Serialize, Deserialize)]
impl std::fmt::Display for MeltQuoteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MeltQuoteState::Unpaid => "UNPAID",
            MeltQuoteState::Pending => "PENDING",
            MeltQuoteState::Paid => "PAID",
        };
        f.write_str(s)
    }
}

pub struct MeltQuote {
    pub quote: String,
    pub amount: u64,
    pub fee_reserve: u64,
    pub unit: CurrencyUnit,
    pub state: MeltQuoteState,
    pub expiry: u64,
    pub payment_preimage: Option<String>,
}

/// NUT-11 P2PK locking options attached to the `send` side of a swap.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct P2pkLock {
    pub pubkey: String,
}

/// Controls how a `swap` call splits its outputs. Mirrors the spec's
/// `outputConfig` shape: absent entirely for an unlocked split, present with
/// a `send` lock for P2PK sends.
#[derive(Debug, Clone, Default)]
pub struct SwapOutputConfig {
    pub send_lock: Option<P2pkLock>,
}

/// Outcome of a mint `swap`: the proofs the wallet keeps and the proofs
/// destined for the counterparty (a send) or the mint (a melt).
#[derive(Debug, Clone)]
pub struct SwapOutcome {
    pub keep: Vec<NewProof>,
    pub send: Vec<NewProof>,
}

/// Outcome of a successful `meltProofs` call.
#[derive(Debug, Clone)]
pub struct MeltOutcome {
    pub quote: MeltQuote,
    pub change: Vec<NewProof>,
}

/// State of one proof as reported by `checkProofStates`, keyed by its
/// secret so the engine can apply the result without re-deriving `Y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MintProofState {
    Unspent,
    Pending,
    Spent,
}

#[derive(Debug, Clone)]
pub struct ProofStateEntry {
    pub secret: String,
    pub state: MintProofState,
}

impl std::fmt::Display for MintProofState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MintProofState::Unspent => "UNSPENT",
            MintProofState::Pending => "PENDING",
            MintProofState::Spent => "SPENT",
        };
        f.write_str(s)
    }
}

/// A decoded Cashu token: which mint it targets, what unit it is
/// denominated in, and the proofs it carries.
#[derive(Debug, Clone, Serialize)]
pub struct DecodedToken {
    pub mint_url: String,
    pub unit: CurrencyUnit,
    pub memo: Option<String>,
    pub proofs: Vec<Proof>,
}

/// Structured error surfaced by a failed mint HTTP call, carrying the
/// mint's numeric error code (NUT error codes 11001/11002 drive the melt
/// reclassification in spec §4.4.7).
#[derive(Debug, Clone, thiserror::Error)]
#[error("mint operation failed ({code:?}): {message}")]
pub struct MintOperationError {
    pub code: Option<i32>,
    pub message: String,
}

impl MintOperationError {
    pub const PROOFS_ALREADY_SPENT: i32 = 11001;
    pub const PROOFS_PENDING: i32 = 11002;

    pub fn is_code(&self, code: i32) -> bool {
        self.code == Some(code)
    }
}
