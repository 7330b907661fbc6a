//! Availability calculator

use crate::{
    error::AppResult,
    models::inventory::{Availability, CopiesSummary},
    repository::Repository,
};

#[derive(Clone)]
pub struct AvailabilityService {
    repository: Repository,
}

impl AvailabilityService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Copies of a book free for lending at a branch.
    ///
    /// Re-reads the ledgers on every call. A pair with no inventory row has
    /// zero capacity.
    pub async fn available_copies(&self, book_id: i32, branch_id: i32) -> AppResult<i64> {
        Ok(self.ledger(book_id, branch_id).await?.available())
    }

    /// Raw ledger figures for a pair
    pub async fn ledger(&self, book_id: i32, branch_id: i32) -> AppResult<Availability> {
        self.repository
            .inventories
            .availability(&self.repository.pool, book_id, branch_id)
            .await
    }

    /// Total and available copies with display names
    pub async fn copies_summary(&self, book_id: i32, branch_id: i32) -> AppResult<CopiesSummary> {
        let ledger = self.ledger(book_id, branch_id).await?;
        let book_title = self.repository.books.title(book_id).await?;
        let branch_name = self.repository.branches.name(branch_id).await?;

        Ok(CopiesSummary {
            book_id,
            branch_id,
            book_title,
            branch_name,
            copies_total: ledger.copies_total,
            available: ledger.available(),
        })
    }
}
