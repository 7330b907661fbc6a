//! Borrow transaction manager

use serde_json::json;

use crate::{
    error::{AppError, AppResult, BorrowError},
    models::{
        borrow::{Borrow, BorrowLine, ReturnOutcome},
        event_log::EventKind,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
}

impl BorrowsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Open a loan if the branch has a free copy of the book.
    ///
    /// The inventory row of the pair is locked before availability is read,
    /// so concurrent borrows of the same pair queue behind each other. A
    /// refusal rolls the transaction back and is audited on its own.
    pub async fn borrow_book(&self, student_id: i32, book_id: i32, branch_id: i32) -> AppResult<Borrow> {
        let mut tx = self.repository.pool.begin().await?;

        self.repository
            .inventories
            .lock_pair(&mut tx, book_id, branch_id)
            .await?;
        let availability = self
            .repository
            .inventories
            .availability(&mut *tx, book_id, branch_id)
            .await?;

        if !availability.can_lend() {
            tx.rollback().await?;

            tracing::warn!(
                student_id,
                book_id,
                branch_id,
                copies_total = availability.copies_total,
                open_borrows = availability.open_borrows,
                "borrow refused: no copies available"
            );
            self.repository
                .events
                .record_detached(
                    &EventKind::NoCopiesAvailable,
                    Some(json!({
                        "student_id": student_id,
                        "book_id": book_id,
                        "branch_id": branch_id,
                    })),
                )
                .await?;

            return Err(BorrowError::NoCopiesAvailable {
                student_id,
                book_id,
                branch_id,
            }
            .into());
        }

        let borrow = self
            .repository
            .borrows
            .insert(&mut tx, student_id, book_id, branch_id)
            .await?;
        tx.commit().await?;

        tracing::info!(
            borrow_id = borrow.id,
            student_id,
            book_id,
            branch_id,
            available_before = availability.available(),
            "book borrowed"
        );
        Ok(borrow)
    }

    /// Close an open loan.
    ///
    /// Returning a missing or already-closed loan changes nothing and yields a
    /// warning outcome.
    pub async fn return_borrow(&self, borrow_id: i32) -> AppResult<ReturnOutcome> {
        let mut tx = self.repository.pool.begin().await?;

        let outcome = match self.repository.borrows.lock(&mut tx, borrow_id).await? {
            None => ReturnOutcome::NotFound(borrow_id),
            Some(borrow) if !borrow.is_open() => ReturnOutcome::AlreadyReturned(borrow),
            Some(_) => {
                let returned = self
                    .repository
                    .borrows
                    .mark_returned(&mut tx, borrow_id)
                    .await?
                    .ok_or_else(|| AppError::Internal(format!("Locked borrow {} is no longer open", borrow_id)))?;

                self.repository
                    .events
                    .record(
                        &mut *tx,
                        &EventKind::BorrowReturned,
                        Some(json!({
                            "borrow_id": returned.id,
                            "student_id": returned.student_id,
                            "book_id": returned.book_id,
                            "branch_id": returned.branch_id,
                        })),
                    )
                    .await?;
                ReturnOutcome::Returned(returned)
            }
        };

        if outcome.is_warning() {
            tx.rollback().await?;
            tracing::warn!(borrow_id, "{}", outcome.message());
        } else {
            tx.commit().await?;
            tracing::info!(borrow_id, "book returned");
        }

        Ok(outcome)
    }

    /// Borrow ledger with display names, most recent first
    pub async fn list(&self) -> AppResult<Vec<BorrowLine>> {
        self.repository.borrows.list().await
    }

    /// Get a borrow by ID
    pub async fn get(&self, borrow_id: i32) -> AppResult<Borrow> {
        self.repository
            .borrows
            .get_by_id(borrow_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow with id {} not found", borrow_id)))
    }

    /// Count loans not yet returned
    pub async fn count_open(&self) -> AppResult<i64> {
        self.repository.borrows.count_open().await
    }
}
