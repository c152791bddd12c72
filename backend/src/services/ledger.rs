//! Ledger Access service
//!
//! Typed save/list/delete over the per-owner transaction store. Owns id
//! generation, description normalization and timestamps. The store is a
//! Postgres table of JSON documents keyed by `(user_id, id)`; `save` is
//! an upsert, so writing an existing id replaces the record.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex as StdMutex};

use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::AppResult;
use shared::models::Transaction;

/// Last issued id, kept so two saves in the same microsecond still get
/// distinct, increasing ids within this process.
static LAST_ISSUED_ID: AtomicI64 = AtomicI64::new(0);

/// Ledger access over the document store.
#[derive(Clone)]
pub struct LedgerService {
    db: PgPool,
}

impl LedgerService {
    /// Create a new LedgerService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Issue a fresh transaction id: the current timestamp in
    /// microseconds, bumped past the previously issued id if needed.
    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_micros();
        let previous = LAST_ISSUED_ID
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or(now);
        now.max(previous + 1).to_string()
    }

    /// Persist a transaction into the owner's partition.
    ///
    /// Assigns an id and `created_at` on first save, always refreshes
    /// `last_updated`, normalizes the description and stamps the owner.
    pub async fn save(&self, mut tx: Transaction, owner: &str) -> AppResult<Transaction> {
        let now = Utc::now();
        if tx.id.is_empty() {
            tx.id = self.next_id();
            tx.created_at = Some(now);
        }
        tx.user_id = owner.to_string();
        tx.last_updated = Some(now);
        tx.normalize_description();

        sqlx::query(
            r#"
            INSERT INTO ledger_records (user_id, id, record)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, id) DO UPDATE SET record = EXCLUDED.record
            "#,
        )
        .bind(owner)
        .bind(&tx.id)
        .bind(Json(&tx))
        .execute(&self.db)
        .await?;

        Ok(tx)
    }

    /// All records in the owner's partition, unordered with respect to
    /// insertion. Callers must sort if order matters.
    pub async fn list(&self, owner: &str) -> AppResult<Vec<Transaction>> {
        let records = sqlx::query_scalar::<_, Json<Transaction>>(
            "SELECT record FROM ledger_records WHERE user_id = $1",
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await?;

        Ok(records.into_iter().map(|Json(tx)| tx).collect())
    }

    /// Point read of one record.
    pub async fn get(&self, id: &str, owner: &str) -> AppResult<Option<Transaction>> {
        let record = sqlx::query_scalar::<_, Json<Transaction>>(
            "SELECT record FROM ledger_records WHERE user_id = $1 AND id = $2",
        )
        .bind(owner)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        Ok(record.map(|Json(tx)| tx))
    }

    /// Best-effort point delete. A missing id is a `false`, not an error.
    pub async fn delete(&self, id: &str, owner: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM ledger_records WHERE user_id = $1 AND id = $2")
            .bind(owner)
            .bind(id)
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Per-owner write serialization.
///
/// Every bulk mutation is read-all/compute/write-many with no store-side
/// transaction; holding the owner's lock across the whole sequence is
/// what keeps two sessions from interleaving their writes.
#[derive(Clone, Default)]
pub struct OwnerLocks {
    inner: Arc<StdMutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl OwnerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the mutation lock for one owner, creating it on first use.
    pub async fn acquire(&self, owner: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().expect("owner lock map poisoned");
            map.entry(owner.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_monotonic() {
        let now = Utc::now().timestamp_micros();
        let mut previous = 0i64;
        for _ in 0..1000 {
            let issued = LAST_ISSUED_ID
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                    Some(now.max(last + 1))
                })
                .unwrap_or(now);
            let id = now.max(issued + 1);
            assert!(id > previous);
            previous = id;
        }
    }

    #[tokio::test]
    async fn test_owner_locks_are_per_owner() {
        let locks = OwnerLocks::new();
        let _ana = locks.acquire("ana@example.com").await;
        // A different owner must not block.
        let _rui = locks.acquire("rui@example.com").await;
    }
}
