use async_trait::async_trait;
use nutvault_common::{NewProof, Proof, ProofStatus, Wallet};

use crate::error::StoreResult;

/// Caps supplied at wallet creation; `None` leaves the process-wide default
/// in force (see `nutvault_common::limits`).
#[derive(Debug, Clone, Copy, Default)]
pub struct WalletLimits {
    pub max_balance: Option<u64>,
    pub max_send: Option<u64>,
    pub max_pay: Option<u64>,
}

/// Durable persistence of wallets and proofs. Every multi-row write used by
/// one engine operation is expected to commit atomically; implementations
/// must use a single transaction per call that touches more than one row.
#[async_trait]
pub trait Store: Send + Sync {
    async fn create_wallet(
        &self,
        access_key: &str,
        name: Option<&str>,
        mint_url: &str,
        unit: nutvault_common::CurrencyUnit,
        limits: WalletLimits,
    ) -> StoreResult<Wallet>;

    async fn find_wallet_by_access_key(&self, access_key: &str) -> StoreResult<Option<Wallet>>;

    async fn find_wallet_by_id(&self, id: i64) -> StoreResult<Option<Wallet>>;

    /// Used only on new-wallet rollback (e.g. the mint is unreachable right
    /// after the row was created).
    async fn delete_wallet(&self, id: i64) -> StoreResult<()>;

    async fn delete_proofs_by_wallet(&self, id: i64) -> StoreResult<()>;

    /// Sum of `amount` for all of `wallet_id`'s proofs in `status`. Zero,
    /// never null, when there are none.
    async fn aggregate_amount(&self, wallet_id: i64, status: ProofStatus) -> StoreResult<u64>;

    /// Lists a wallet's proofs, optionally filtered by status. `None`
    /// defaults to UNSPENT.
    async fn list_proofs(&self, wallet_id: i64, status: Option<ProofStatus>) -> StoreResult<Vec<Proof>>;

    /// Inserts `proofs` for `wallet_id` at `status`, in one transaction.
    async fn insert_proofs(
        &self,
        wallet_id: i64,
        proofs: &[NewProof],
        status: ProofStatus,
    ) -> StoreResult<Vec<Proof>>;

    /// Moves every proof in `secrets` owned by `wallet_id` to `status`, in
    /// one statement. The `wallet_id` constraint prevents a caller from
    /// touching another wallet's rows even if it somehow knew their
    /// secrets.
    async fn update_status(
        &self,
        wallet_id: i64,
        secrets: &[String],
        status: ProofStatus,
    ) -> StoreResult<u64>;
}
