//! Inventory ledger model and the availability calculation

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Total copies of a book held at a branch, unique per (book, branch)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Inventory {
    pub id: i32,
    pub book_id: i32,
    pub branch_id: i32,
    pub copies_total: i32,
}

/// Upsert request for an inventory row
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventoryWrite {
    pub book_id: i32,
    pub branch_id: i32,
    pub copies_total: i32,
}

impl InventoryWrite {
    /// Row contents as recorded in the audit trail when the write is vetoed
    pub fn attempted_row(&self, id: Option<i32>) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "book_id": self.book_id,
            "branch_id": self.branch_id,
            "copies_total": self.copies_total,
        })
    }
}

/// Raw ledger figures for one (book, branch) pair.
///
/// Every availability figure served by the application is derived through
/// [`Availability::available`], whether it comes from a single lookup or the
/// inventory list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, FromRow)]
pub struct Availability {
    /// 0 when the pair has no inventory row
    pub copies_total: i64,
    pub open_borrows: i64,
}

impl Availability {
    pub fn available(&self) -> i64 {
        self.copies_total - self.open_borrows
    }

    /// Negative figures only arise from data edited outside the guarded path
    pub fn can_lend(&self) -> bool {
        self.available() > 0
    }
}

/// Inventory list entry with names and derived availability
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InventoryLine {
    pub id: i32,
    pub book_id: i32,
    pub branch_id: i32,
    pub title: String,
    pub branch: String,
    pub copies_total: i64,
    pub available: i64,
}

/// Database row behind [`InventoryLine`]
#[derive(Debug, FromRow)]
pub struct InventoryLineRow {
    pub id: i32,
    pub book_id: i32,
    pub branch_id: i32,
    pub title: String,
    pub branch: String,
    #[sqlx(flatten)]
    pub ledger: Availability,
}

impl From<InventoryLineRow> for InventoryLine {
    fn from(row: InventoryLineRow) -> Self {
        Self {
            id: row.id,
            book_id: row.book_id,
            branch_id: row.branch_id,
            title: row.title,
            branch: row.branch,
            copies_total: row.ledger.copies_total,
            available: row.ledger.available(),
        }
    }
}

/// Copies of a book at a branch
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CopiesSummary {
    pub book_id: i32,
    pub branch_id: i32,
    pub book_title: Option<String>,
    pub branch_name: Option<String>,
    pub copies_total: i64,
    pub available: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_inventory_has_no_capacity() {
        let availability = Availability::default();
        assert_eq!(availability.available(), 0);
        assert!(!availability.can_lend());
    }

    #[test]
    fn test_open_borrows_are_subtracted() {
        let availability = Availability { copies_total: 5, open_borrows: 2 };
        assert_eq!(availability.available(), 3);
        assert!(availability.can_lend());

        let exhausted = Availability { copies_total: 5, open_borrows: 5 };
        assert_eq!(exhausted.available(), 0);
        assert!(!exhausted.can_lend());
    }

    #[test]
    fn test_corrupted_counts_never_lend() {
        let corrupted = Availability { copies_total: 1, open_borrows: 3 };
        assert_eq!(corrupted.available(), -2);
        assert!(!corrupted.can_lend());
    }

    #[test]
    fn test_line_uses_same_calculation() {
        let line = InventoryLine::from(InventoryLineRow {
            id: 1,
            book_id: 2,
            branch_id: 3,
            title: "History of Europe".into(),
            branch: "Main".into(),
            ledger: Availability { copies_total: 2, open_borrows: 1 },
        });
        assert_eq!(line.available, 1);
    }

    #[test]
    fn test_attempted_row_contents() {
        let write = InventoryWrite { book_id: 4, branch_id: 5, copies_total: -3 };
        let row = write.attempted_row(Some(9));
        assert_eq!(row["id"], 9);
        assert_eq!(row["copies_total"], -3);
        assert!(write.attempted_row(None)["id"].is_null());
    }
}
