//! Inventory ledger writes behind the negative-copies guard

use sqlx::{Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::{
        event_log::EventKind,
        inventory::{Inventory, InventoryLine, InventoryWrite},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct InventoryService {
    repository: Repository,
}

impl InventoryService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Inventory rows with derived availability
    pub async fn list(&self) -> AppResult<Vec<InventoryLine>> {
        self.repository.inventories.list().await
    }

    /// Create or replace the copy count of a pair
    pub async fn set_copies(&self, write: &InventoryWrite) -> AppResult<Inventory> {
        let mut tx = self.repository.pool.begin().await?;
        match self.repository.inventories.upsert(&mut tx, write).await {
            Ok(inventory) => {
                tx.commit().await?;
                tracing::info!(
                    book_id = inventory.book_id,
                    branch_id = inventory.branch_id,
                    copies_total = inventory.copies_total,
                    "inventory updated"
                );
                Ok(inventory)
            }
            Err(AppError::InvariantViolation(row)) => Err(self.reject(tx, row).await),
            Err(e) => Err(e),
        }
    }

    /// Add a signed delta to the copy count of a pair
    pub async fn adjust_copies(&self, book_id: i32, branch_id: i32, delta: i32) -> AppResult<Inventory> {
        let mut tx = self.repository.pool.begin().await?;
        match self
            .repository
            .inventories
            .adjust(&mut tx, book_id, branch_id, delta)
            .await
        {
            Ok(inventory) => {
                tx.commit().await?;
                tracing::info!(
                    book_id,
                    branch_id,
                    delta,
                    copies_total = inventory.copies_total,
                    "inventory adjusted"
                );
                Ok(inventory)
            }
            Err(AppError::InvariantViolation(row)) => Err(self.reject(tx, row).await),
            Err(e) => Err(e),
        }
    }

    /// Roll back the vetoed write, then audit it on its own so the entry
    /// survives the rollback.
    async fn reject(&self, tx: Transaction<'_, Postgres>, row: serde_json::Value) -> AppError {
        if let Err(e) = tx.rollback().await {
            return e.into();
        }

        tracing::error!(attempted = %row, "rejected negative inventory write");

        if let Err(e) = self
            .repository
            .events
            .record_detached(&EventKind::NegativeInventoryAttempt, Some(row.clone()))
            .await
        {
            return e;
        }

        AppError::InvariantViolation(row)
    }
}
