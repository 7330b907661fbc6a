//! Borrow ledger repository

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::AppResult,
    models::borrow::{Borrow, BorrowLine},
};

use super::map_constraint_error;

#[derive(Clone)]
pub struct BorrowsRepository {
    pool: Pool<Postgres>,
}

impl BorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get borrow by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(borrow)
    }

    /// Open a loan stamped with the current time
    pub async fn insert(&self, conn: &mut PgConnection, student_id: i32, book_id: i32, branch_id: i32) -> AppResult<Borrow> {
        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (student_id, book_id, branch_id, borrowed_at)
            VALUES ($1, $2, $3, NOW())
            RETURNING *
            "#,
        )
        .bind(student_id)
        .bind(book_id)
        .bind(branch_id)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_constraint_error(e, "Borrow"))?;
        Ok(borrow)
    }

    /// Lock a borrow row for the rest of the transaction
    pub async fn lock(&self, conn: &mut PgConnection, id: i32) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>("SELECT * FROM borrows WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;
        Ok(borrow)
    }

    /// Stamp `returned_at` on an open borrow. `None` if it was not open.
    pub async fn mark_returned(&self, conn: &mut PgConnection, id: i32) -> AppResult<Option<Borrow>> {
        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            UPDATE borrows SET returned_at = NOW()
            WHERE id = $1 AND returned_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(borrow)
    }

    /// All borrows with display names, most recent first
    pub async fn list(&self) -> AppResult<Vec<BorrowLine>> {
        let rows = sqlx::query_as::<_, BorrowLine>(
            r#"
            SELECT bo.id, s.full_name AS student, b.title AS book, br.name AS branch,
                   bo.borrowed_at, bo.returned_at
            FROM borrows bo
            JOIN students s ON s.id = bo.student_id
            JOIN books b ON b.id = bo.book_id
            JOIN branches br ON br.id = bo.branch_id
            ORDER BY bo.borrowed_at DESC, bo.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Count loans not yet returned
    pub async fn count_open(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrows WHERE returned_at IS NULL")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
