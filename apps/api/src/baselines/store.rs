//! Baseline Repository — atomic persistence of the baseline entity graph.
//!
//! `AppState` holds an `Arc<dyn BaselineStore>`; `PgBaselineStore` is the
//! production backend.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use sqlx::PgPool;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::baselines::builder::NewBaseline;
use crate::middleware::account::AccountId;
use crate::models::baseline::BaselineRow;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("baseline {0} not found")]
    NotFound(i64),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// A persisted baseline together with its inventory associations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredBaseline {
    pub id: i64,
    pub account: i32,
    pub name: String,
    pub config: Value,
    /// Ascending order.
    pub inventory_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl StoredBaseline {
    fn from_row(row: BaselineRow, inventory_ids: Vec<Uuid>) -> Self {
        StoredBaseline {
            id: row.id,
            account: row.account_id,
            name: row.name,
            config: row.config,
            inventory_ids,
            created_at: row.created_at,
        }
    }
}

/// Get and delete are scoped to the owning account: another account's
/// baseline is reported as `NotFound`.
#[async_trait]
pub trait BaselineStore: Send + Sync {
    /// Inserts the baseline and all of its associations, all or nothing.
    async fn create(&self, baseline: &NewBaseline) -> Result<i64, StoreError>;

    async fn get(&self, account: AccountId, id: i64) -> Result<StoredBaseline, StoreError>;

    /// Removes the baseline; its associations go with it.
    async fn delete(&self, account: AccountId, id: i64) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct PgBaselineStore {
    pool: PgPool,
}

impl PgBaselineStore {
    pub fn new(pool: PgPool) -> Self {
        PgBaselineStore { pool }
    }
}

#[async_trait]
impl BaselineStore for PgBaselineStore {
    async fn create(&self, baseline: &NewBaseline) -> Result<i64, StoreError> {
        // Rolled back on drop unless committed, so an error, panic or a
        // dropped request future never leaves a partial baseline behind.
        let mut tx = self.pool.begin().await?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO baseline (account_id, name, config) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(baseline.account.0)
        .bind(&baseline.name)
        .bind(&baseline.config)
        .fetch_one(&mut *tx)
        .await?;

        if !baseline.inventory_ids.is_empty() {
            sqlx::query(
                r#"
                INSERT INTO baseline_inventory (baseline_id, inventory_id)
                SELECT $1, UNNEST($2::uuid[])
                "#,
            )
            .bind(id)
            .bind(&baseline.inventory_ids)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        info!(
            "Created baseline {id} for account {} with {} inventories",
            baseline.account,
            baseline.inventory_ids.len()
        );
        Ok(id)
    }

    async fn get(&self, account: AccountId, id: i64) -> Result<StoredBaseline, StoreError> {
        let row = sqlx::query_as::<_, BaselineRow>(
            "SELECT id, account_id, name, config, created_at FROM baseline WHERE id = $1 AND account_id = $2",
        )
        .bind(id)
        .bind(account.0)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound(id))?;

        let inventory_ids: Vec<Uuid> = sqlx::query_scalar(
            "SELECT inventory_id FROM baseline_inventory WHERE baseline_id = $1 ORDER BY inventory_id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(StoredBaseline::from_row(row, inventory_ids))
    }

    async fn delete(&self, account: AccountId, id: i64) -> Result<(), StoreError> {
        // baseline_inventory rows cascade via the foreign key.
        let result = sqlx::query("DELETE FROM baseline WHERE id = $1 AND account_id = $2")
            .bind(id)
            .bind(account.0)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id));
        }

        debug!("Deleted baseline {id} for account {account}");
        Ok(())
    }
}

/// In-memory store used by the handler tests.
#[cfg(test)]
pub mod memory {
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    pub struct MemoryBaselineStore {
        rows: Mutex<BTreeMap<i64, StoredBaseline>>,
    }

    #[async_trait]
    impl BaselineStore for MemoryBaselineStore {
        async fn create(&self, baseline: &NewBaseline) -> Result<i64, StoreError> {
            let mut rows = self.rows.lock().unwrap();
            let id = rows.keys().next_back().copied().unwrap_or(0) + 1;
            rows.insert(
                id,
                StoredBaseline {
                    id,
                    account: baseline.account.0,
                    name: baseline.name.clone(),
                    config: baseline.config.clone(),
                    inventory_ids: baseline.inventory_ids.clone(),
                    created_at: Utc::now(),
                },
            );
            Ok(id)
        }

        async fn get(&self, account: AccountId, id: i64) -> Result<StoredBaseline, StoreError> {
            self.rows
                .lock()
                .unwrap()
                .get(&id)
                .filter(|b| b.account == account.0)
                .cloned()
                .ok_or(StoreError::NotFound(id))
        }

        async fn delete(&self, account: AccountId, id: i64) -> Result<(), StoreError> {
            let mut rows = self.rows.lock().unwrap();
            match rows.get(&id) {
                Some(b) if b.account == account.0 => {
                    rows.remove(&id);
                    Ok(())
                }
                _ => Err(StoreError::NotFound(id)),
            }
        }
    }

    /// Fails every write, for exercising the opaque 500 path.
    pub struct FailingBaselineStore;

    #[async_trait]
    impl BaselineStore for FailingBaselineStore {
        async fn create(&self, _baseline: &NewBaseline) -> Result<i64, StoreError> {
            Err(StoreError::Database(sqlx::Error::Protocol(
                "connection reset while inserting baseline_inventory".to_string(),
            )))
        }

        async fn get(&self, _account: AccountId, id: i64) -> Result<StoredBaseline, StoreError> {
            Err(StoreError::NotFound(id))
        }

        async fn delete(&self, _account: AccountId, id: i64) -> Result<(), StoreError> {
            Err(StoreError::NotFound(id))
        }
    }
}
