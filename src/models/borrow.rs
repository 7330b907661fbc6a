//! Borrow ledger model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Loan of one copy. Open while `returned_at` is null.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Borrow {
    pub id: i32,
    pub student_id: i32,
    pub book_id: i32,
    pub branch_id: i32,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

impl Borrow {
    pub fn is_open(&self) -> bool {
        self.returned_at.is_none()
    }
}

/// Borrow request
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateBorrow {
    pub student_id: i32,
    pub book_id: i32,
    pub branch_id: i32,
}

/// Borrow list entry with display names
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BorrowLine {
    pub id: i32,
    pub student: String,
    pub book: String,
    pub branch: String,
    pub borrowed_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
}

/// Result of a return request. Only `Returned` changes state.
#[derive(Debug, Clone)]
pub enum ReturnOutcome {
    Returned(Borrow),
    AlreadyReturned(Borrow),
    NotFound(i32),
}

impl ReturnOutcome {
    pub fn is_warning(&self) -> bool {
        !matches!(self, ReturnOutcome::Returned(_))
    }

    pub fn message(&self) -> String {
        match self {
            ReturnOutcome::Returned(b) => format!("Borrow {} returned", b.id),
            ReturnOutcome::AlreadyReturned(b) => format!("Borrow {} was already returned", b.id),
            ReturnOutcome::NotFound(id) => format!("Borrow {} not found", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn borrow(returned_at: Option<DateTime<Utc>>) -> Borrow {
        Borrow {
            id: 7,
            student_id: 1,
            book_id: 2,
            branch_id: 3,
            borrowed_at: Utc::now(),
            returned_at,
        }
    }

    #[test]
    fn test_open_borrow() {
        assert!(borrow(None).is_open());
        assert!(!borrow(Some(Utc::now())).is_open());
    }

    #[test]
    fn test_only_returned_is_not_a_warning() {
        assert!(!ReturnOutcome::Returned(borrow(Some(Utc::now()))).is_warning());
        assert!(ReturnOutcome::AlreadyReturned(borrow(Some(Utc::now()))).is_warning());
        assert!(ReturnOutcome::NotFound(42).is_warning());
        assert_eq!(ReturnOutcome::NotFound(42).message(), "Borrow 42 not found");
    }
}
