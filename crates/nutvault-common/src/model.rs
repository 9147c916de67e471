use serde::{Deserialize, Serialize};

/// Currency unit a wallet and its proofs are denominated in.
///
/// Only `sat` and `msat` are accepted; this mirrors the mint's own unit
/// discipline rather than supporting the full NUT-00 unit list, since the
/// engine never needs to convert between units itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencyUnit {
    Sat,
    Msat,
}

impl CurrencyUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrencyUnit::Sat => "sat",
            CurrencyUnit::Msat => "msat",
        }
    }
}

impl std::str::FromStr for CurrencyUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sat" => Ok(CurrencyUnit::Sat),
            "msat" => Ok(CurrencyUnit::Msat),
            other => Err(format!("unsupported unit `{other}`")),
        }
    }
}

impl std::fmt::Display for CurrencyUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An isolated balance scope, addressable by its bearer `access_key`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: i64,
    pub access_key: String,
    pub name: Option<String>,
    pub mint_url: String,
    pub unit: CurrencyUnit,
    pub max_balance: Option<u64>,
    pub max_send: Option<u64>,
    pub max_pay: Option<u64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Status of one ecash note. Transitions are constrained by
/// [`ProofStatus::can_transition_to`]: SPENT is terminal, UNSPENT and
/// PENDING may move to each other or to SPENT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProofStatus {
    Unspent,
    Pending,
    Spent,
}

impl ProofStatus {
    pub fn can_transition_to(self, next: ProofStatus) -> bool {
        match self {
            ProofStatus::Spent => next == ProofStatus::Spent,
            ProofStatus::Unspent | ProofStatus::Pending => true,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProofStatus::Unspent => "UNSPENT",
            ProofStatus::Pending => "PENDING",
            ProofStatus::Spent => "SPENT",
        }
    }
}

impl std::str::FromStr for ProofStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "UNSPENT" => Ok(ProofStatus::Unspent),
            "PENDING" => Ok(ProofStatus::Pending),
            "SPENT" => Ok(ProofStatus::Spent),
            other => Err(format!("unknown proof status `{other}`")),
        }
    }
}

/// One ecash note as persisted by the store.
///
/// `secret` is the mint's double-spend key and this store's idempotency
/// anchor: it is globally unique across every wallet (see invariant I1 in
/// the spec), never just unique per wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Proof {
    pub id: i64,
    pub wallet_id: i64,
    pub proof_id: String,
    pub amount: u64,
    pub secret: String,
    pub c: String,
    pub dleq: Option<String>,
    pub witness: Option<String>,
    pub status: ProofStatus,
    pub created_at: i64,
}

/// The shape of a proof before it has a row identity, as returned by the
/// mint client and handed to the store for insertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProof {
    pub proof_id: String,
    pub amount: u64,
    pub secret: String,
    pub c: String,
    pub dleq: Option<String>,
    pub witness: Option<String>,
}
