use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use nutvault_common::{CurrencyUnit, NewProof, Proof, ProofStatus, Wallet};
use tracing::instrument;

use crate::error::{StoreError, StoreResult};
use crate::pool::Pool;
use crate::store::{Store, WalletLimits};

const MIGRATIONS: &[&str] = &[include_str!("migrations/0001_init.sql")];

/// `Store` backed by PostgreSQL via a hand-rolled `tokio_postgres` pool.
pub struct PostgresStore {
    pool: Arc<Pool>,
}

impl std::fmt::Debug for PostgresStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresStore").field("pool", &self.pool).finish()
    }
}

impl PostgresStore {
    /// Connects to `dsn`, runs pending migrations, and returns a ready
    /// store. `max_size` bounds the pool; `connect_timeout` is the default
    /// wait for a free connection.
    pub async fn connect(dsn: &str, max_size: usize, connect_timeout: Duration) -> StoreResult<Self> {
        let pool = Pool::new(dsn, max_size, connect_timeout);
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> StoreResult<()> {
        let conn = self.pool.get().await?;
        for migration in MIGRATIONS {
            conn.batch_execute(migration).await?;
        }
        Ok(())
    }

    fn row_to_wallet(row: &tokio_postgres::Row) -> Wallet {
        let unit_str: String = row.get("unit");
        Wallet {
            id: row.get("id"),
            access_key: row.get("access_key"),
            name: row.get("name"),
            mint_url: row.get("mint_url"),
            unit: CurrencyUnit::from_str(&unit_str).unwrap_or(CurrencyUnit::Sat),
            max_balance: row.get::<_, Option<i64>>("max_balance").map(|v| v as u64),
            max_send: row.get::<_, Option<i64>>("max_send").map(|v| v as u64),
            max_pay: row.get::<_, Option<i64>>("max_pay").map(|v| v as u64),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_proof(row: &tokio_postgres::Row) -> Proof {
        let status_str: String = row.get("status");
        Proof {
            id: row.get("id"),
            wallet_id: row.get("wallet_id"),
            proof_id: row.get("proof_id"),
            amount: row.get::<_, i64>("amount") as u64,
            secret: row.get("secret"),
            c: row.get("c"),
            dleq: row.get("dleq"),
            witness: row.get("witness"),
            status: ProofStatus::from_str(&status_str).unwrap_or(ProofStatus::Unspent),
            created_at: row.get("created_at"),
        }
    }

    fn now() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[async_trait]
impl Store for PostgresStore {
    #[instrument(skip(self))]
    async fn create_wallet(
        &self,
        access_key: &str,
        name: Option<&str>,
        mint_url: &str,
        unit: CurrencyUnit,
        limits: WalletLimits,
    ) -> StoreResult<Wallet> {
        let conn = self.pool.get().await?;
        let now = Self::now();
        let row = conn
            .query_one(
                "INSERT INTO wallets (access_key, name, mint_url, unit, max_balance, max_send, max_pay, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
                 RETURNING id, access_key, name, mint_url, unit, max_balance, max_send, max_pay, created_at, updated_at",
                &[
                    &access_key,
                    &name,
                    &mint_url,
                    &unit.as_str(),
                    &limits.max_balance.map(|v| v as i64),
                    &limits.max_send.map(|v| v as i64),
                    &limits.max_pay.map(|v| v as i64),
                    &now,
                ],
            )
            .await?;
        Ok(Self::row_to_wallet(&row))
    }

    async fn find_wallet_by_access_key(&self, access_key: &str) -> StoreResult<Option<Wallet>> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_opt(
                "SELECT id, access_key, name, mint_url, unit, max_balance, max_send, max_pay, created_at, updated_at
                 FROM wallets WHERE access_key = $1",
                &[&access_key],
            )
            .await?;
        Ok(row.as_ref().map(Self::row_to_wallet))
    }

    async fn find_wallet_by_id(&self, id: i64) -> StoreResult<Option<Wallet>> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_opt(
                "SELECT id, access_key, name, mint_url, unit, max_balance, max_send, max_pay, created_at, updated_at
                 FROM wallets WHERE id = $1",
                &[&id],
            )
            .await?;
        Ok(row.as_ref().map(Self::row_to_wallet))
    }

    async fn delete_wallet(&self, id: i64) -> StoreResult<()> {
        let conn = self.pool.get().await?;
        conn.execute("DELETE FROM wallets WHERE id = $1", &[&id]).await?;
        Ok(())
    }

    async fn delete_proofs_by_wallet(&self, id: i64) -> StoreResult<()> {
        let conn = self.pool.get().await?;
        conn.execute("DELETE FROM proofs WHERE wallet_id = $1", &[&id]).await?;
        Ok(())
    }

    async fn aggregate_amount(&self, wallet_id: i64, status: ProofStatus) -> StoreResult<u64> {
        let conn = self.pool.get().await?;
        let row = conn
            .query_one(
                "SELECT COALESCE(SUM(amount), 0)::BIGINT AS total FROM proofs WHERE wallet_id = $1 AND status = $2",
                &[&wallet_id, &status.as_str()],
            )
            .await?;
        let total: i64 = row.get("total");
        Ok(total as u64)
    }

    async fn list_proofs(&self, wallet_id: i64, status: Option<ProofStatus>) -> StoreResult<Vec<Proof>> {
        let conn = self.pool.get().await?;
        let status = status.unwrap_or(ProofStatus::Unspent);
        let rows = conn
            .query(
                "SELECT id, wallet_id, proof_id, amount, secret, c, dleq, witness, status, created_at
                 FROM proofs WHERE wallet_id = $1 AND status = $2 ORDER BY id",
                &[&wallet_id, &status.as_str()],
            )
            .await?;
        Ok(rows.iter().map(Self::row_to_proof).collect())
    }

    #[instrument(skip(self, proofs))]
    async fn insert_proofs(
        &self,
        wallet_id: i64,
        proofs: &[NewProof],
        status: ProofStatus,
    ) -> StoreResult<Vec<Proof>> {
        if proofs.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.pool.get().await?;
        let txn = conn.transaction().await?;
        let now = Self::now();
        let mut inserted = Vec::with_capacity(proofs.len());

        for proof in proofs {
            let row = txn
                .query_one(
                    "INSERT INTO proofs (wallet_id, proof_id, amount, secret, c, dleq, witness, status, created_at)
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                     RETURNING id, wallet_id, proof_id, amount, secret, c, dleq, witness, status, created_at",
                    &[
                        &wallet_id,
                        &proof.proof_id,
                        &(proof.amount as i64),
                        &proof.secret,
                        &proof.c,
                        &proof.dleq,
                        &proof.witness,
                        &status.as_str(),
                        &now,
                    ],
                )
                .await?;
            inserted.push(Self::row_to_proof(&row));
        }

        txn.commit().await?;
        Ok(inserted)
    }

    #[instrument(skip(self, secrets))]
    async fn update_status(&self, wallet_id: i64, secrets: &[String], status: ProofStatus) -> StoreResult<u64> {
        if secrets.is_empty() {
            return Ok(0);
        }
        let conn = self.pool.get().await?;
        let affected = conn
            .execute(
                "UPDATE proofs SET status = $1 WHERE wallet_id = $2 AND secret = ANY($3)",
                &[&status.as_str(), &wallet_id, &secrets],
            )
            .await?;
        Ok(affected)
    }
}
