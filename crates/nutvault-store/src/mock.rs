//! An in-memory stand-in for [`Store`], used by `nutvault-engine`'s tests so
//! the proof-lifecycle state machine can be exercised without a live
//! database. Mirrors the shape of `nutvault-mint-client`'s `MockMintClient`:
//! canned state behind a plain `Mutex`, single-threaded-simple rather than
//! fast.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use nutvault_common::{CurrencyUnit, NewProof, Proof, ProofStatus, Wallet};

use crate::error::StoreResult;
use crate::store::{Store, WalletLimits};

#[derive(Default)]
struct Inner {
    wallets: HashMap<i64, Wallet>,
    proofs: HashMap<i64, Proof>,
}

/// In-memory `Store`. Each `insert_proofs`/`update_status` call locks the
/// whole table for its duration, which is exactly the "one transaction per
/// engine step" contract the real Postgres store gives — just without a
/// database underneath it.
pub struct MockStore {
    inner: Mutex<Inner>,
    next_wallet_id: AtomicI64,
    next_proof_id: AtomicI64,
}

impl Default for MockStore {
    fn default() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            next_wallet_id: AtomicI64::new(1),
            next_proof_id: AtomicI64::new(1),
        }
    }
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl Store for MockStore {
    async fn create_wallet(
        &self,
        access_key: &str,
        name: Option<&str>,
        mint_url: &str,
        unit: CurrencyUnit,
        limits: WalletLimits,
    ) -> StoreResult<Wallet> {
        let mut inner = self.inner.lock().expect("mock store mutex poisoned");
        let id = self.next_wallet_id.fetch_add(1, Ordering::SeqCst);
        let now = Self::now();
        let wallet = Wallet {
            id,
            access_key: access_key.to_string(),
            name: name.map(str::to_string),
            mint_url: mint_url.to_string(),
            unit,
            max_balance: limits.max_balance,
            max_send: limits.max_send,
            max_pay: limits.max_pay,
            created_at: now,
            updated_at: now,
        };
        inner.wallets.insert(id, wallet.clone());
        Ok(wallet)
    }

    async fn find_wallet_by_access_key(&self, access_key: &str) -> StoreResult<Option<Wallet>> {
        let inner = self.inner.lock().expect("mock store mutex poisoned");
        Ok(inner.wallets.values().find(|w| w.access_key == access_key).cloned())
    }

    async fn find_wallet_by_id(&self, id: i64) -> StoreResult<Option<Wallet>> {
        let inner = self.inner.lock().expect("mock store mutex poisoned");
        Ok(inner.wallets.get(&id).cloned())
    }

    async fn delete_wallet(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("mock store mutex poisoned");
        inner.wallets.remove(&id);
        Ok(())
    }

    async fn delete_proofs_by_wallet(&self, id: i64) -> StoreResult<()> {
        let mut inner = self.inner.lock().expect("mock store mutex poisoned");
        inner.proofs.retain(|_, p| p.wallet_id != id);
        Ok(())
    }

    async fn aggregate_amount(&self, wallet_id: i64, status: ProofStatus) -> StoreResult<u64> {
        let inner = self.inner.lock().expect("mock store mutex poisoned");
        Ok(inner
            .proofs
            .values()
            .filter(|p| p.wallet_id == wallet_id && p.status == status)
            .map(|p| p.amount)
            .sum())
    }

    async fn list_proofs(&self, wallet_id: i64, status: Option<ProofStatus>) -> StoreResult<Vec<Proof>> {
        let inner = self.inner.lock().expect("mock store mutex poisoned");
        let status = status.unwrap_or(ProofStatus::Unspent);
        let mut proofs: Vec<Proof> = inner
            .proofs
            .values()
            .filter(|p| p.wallet_id == wallet_id && p.status == status)
            .cloned()
            .collect();
        proofs.sort_by_key(|p| p.id);
        Ok(proofs)
    }

    async fn insert_proofs(
        &self,
        wallet_id: i64,
        proofs: &[NewProof],
        status: ProofStatus,
    ) -> StoreResult<Vec<Proof>> {
        let mut inner = self.inner.lock().expect("mock store mutex poisoned");
        let now = Self::now();
        let mut inserted = Vec::with_capacity(proofs.len());
        for proof in proofs {
            let id = self.next_proof_id.fetch_add(1, Ordering::SeqCst);
            let row = Proof {
                id,
                wallet_id,
                proof_id: proof.proof_id.clone(),
                amount: proof.amount,
                secret: proof.secret.clone(),
                c: proof.c.clone(),
                dleq: proof.dleq.clone(),
                witness: proof.witness.clone(),
                status,
                created_at: now,
            };
            inner.proofs.insert(id, row.clone());
            inserted.push(row);
        }
        Ok(inserted)
    }

    async fn update_status(&self, wallet_id: i64, secrets: &[String], status: ProofStatus) -> StoreResult<u64> {
        let mut inner = self.inner.lock().expect("mock store mutex poisoned");
        let mut affected = 0u64;
        for proof in inner.proofs.values_mut() {
            if proof.wallet_id == wallet_id && secrets.iter().any(|s| s == &proof.secret) {
                proof.status = status;
                affected += 1;
            }
        }
        Ok(affected)
    }
}
