//! Inventory ledger repository and the negative-copies guard

use sqlx::{postgres::PgDatabaseError, PgConnection, PgExecutor, Pool, Postgres};

use super::map_constraint_error;
use crate::{
    error::{AppError, AppResult},
    models::inventory::{Availability, Inventory, InventoryLine, InventoryLineRow, InventoryWrite},
};

/// SQLSTATE for check_violation
const CHECK_VIOLATION: &str = "23514";
/// Raised by both the CHECK constraint and the `inventories_validate` trigger
const NONNEG_CONSTRAINT: &str = "ck_inventories_nonneg";

/// Ledger figures for a pair. `i` is the inventory row and `a` the
/// `v_active_borrows` row; both may be missing.
const LEDGER_COLUMNS: &str = "COALESCE(i.copies_total, 0)::BIGINT AS copies_total, \
     COALESCE(a.active_count, 0)::BIGINT AS open_borrows";

#[derive(Clone)]
pub struct InventoriesRepository {
    pool: Pool<Postgres>,
}

impl InventoriesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Copies configured and open borrows for one (book, branch) pair
    pub async fn availability<'e, E>(&self, executor: E, book_id: i32, branch_id: i32) -> AppResult<Availability>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            r#"
            SELECT {LEDGER_COLUMNS}
            FROM (SELECT $1::INT AS book_id, $2::INT AS branch_id) k
            LEFT JOIN inventories i ON i.book_id = k.book_id AND i.branch_id = k.branch_id
            LEFT JOIN v_active_borrows a ON a.book_id = k.book_id AND a.branch_id = k.branch_id
            "#
        );
        let availability = sqlx::query_as::<_, Availability>(&query)
            .bind(book_id)
            .bind(branch_id)
            .fetch_one(executor)
            .await?;
        Ok(availability)
    }

    /// All inventory rows with names and availability, by title then branch
    pub async fn list(&self) -> AppResult<Vec<InventoryLine>> {
        let query = format!(
            r#"
            SELECT i.id, i.book_id, i.branch_id, b.title, br.name AS branch, {LEDGER_COLUMNS}
            FROM inventories i
            JOIN books b ON b.id = i.book_id
            JOIN branches br ON br.id = i.branch_id
            LEFT JOIN v_active_borrows a ON a.book_id = i.book_id AND a.branch_id = i.branch_id
            ORDER BY b.title, br.name
            "#
        );
        let rows = sqlx::query_as::<_, InventoryLineRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(InventoryLine::from).collect())
    }

    /// Lock the inventory row for a pair until the transaction ends
    pub async fn lock_pair(&self, conn: &mut PgConnection, book_id: i32, branch_id: i32) -> AppResult<Option<Inventory>> {
        let inventory = sqlx::query_as::<_, Inventory>(
            "SELECT * FROM inventories WHERE book_id = $1 AND branch_id = $2 FOR UPDATE",
        )
        .bind(book_id)
        .bind(branch_id)
        .fetch_optional(&mut *conn)
        .await?;
        Ok(inventory)
    }

    /// Create or replace the copy count for a pair
    pub async fn upsert(&self, conn: &mut PgConnection, write: &InventoryWrite) -> AppResult<Inventory> {
        let existing = self.lock_pair(conn, write.book_id, write.branch_id).await?;
        let attempted = write.attempted_row(existing.as_ref().map(|i| i.id));
        guard_copies(write.copies_total as i64, &attempted)?;

        sqlx::query_as::<_, Inventory>(
            r#"
            INSERT INTO inventories (book_id, branch_id, copies_total)
            VALUES ($1, $2, $3)
            ON CONFLICT (book_id, branch_id) DO UPDATE SET copies_total = EXCLUDED.copies_total
            RETURNING *
            "#,
        )
        .bind(write.book_id)
        .bind(write.branch_id)
        .bind(write.copies_total)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| guard_error(e, attempted))
    }

    /// Add `delta` (possibly negative) to an existing copy count.
    ///
    /// The resulting value is only known to the database, so the trigger is
    /// the one that vetoes a negative result here.
    pub async fn adjust(&self, conn: &mut PgConnection, book_id: i32, branch_id: i32, delta: i32) -> AppResult<Inventory> {
        let attempted = serde_json::json!({
            "book_id": book_id,
            "branch_id": branch_id,
            "delta": delta,
        });

        sqlx::query_as::<_, Inventory>(
            r#"
            UPDATE inventories SET copies_total = copies_total + $3
            WHERE book_id = $1 AND branch_id = $2
            RETURNING *
            "#,
        )
        .bind(book_id)
        .bind(branch_id)
        .bind(delta)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| guard_error(e, attempted))?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "No inventory for book {} at branch {}",
                book_id, branch_id
            ))
        })
    }
}

/// Application-side veto, applied before any SQL is sent
pub fn guard_copies(copies_total: i64, attempted: &serde_json::Value) -> AppResult<()> {
    if copies_total < 0 {
        return Err(AppError::InvariantViolation(attempted.clone()));
    }
    Ok(())
}

/// Recognise a database-side veto and recover the attempted row from it.
///
/// The trigger puts the full row in the error detail; a bare CHECK failure
/// carries none, in which case `fallback` describes the attempt. Other
/// constraint failures become client errors.
pub fn guard_error(err: sqlx::Error, fallback: serde_json::Value) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        if db.code().as_deref() == Some(CHECK_VIOLATION) && db.constraint() == Some(NONNEG_CONSTRAINT) {
            let row = db
                .try_downcast_ref::<PgDatabaseError>()
                .and_then(|pg| pg.detail())
                .and_then(|detail| serde_json::from_str(detail).ok())
                .unwrap_or(fallback);
            return AppError::InvariantViolation(row);
        }
    }
    map_constraint_error(err, "Inventory")
}
