//! Repository layer for database operations
//!
//! Reads run against the pool. Writes that belong to a larger unit of work
//! take an explicit `&mut PgConnection` so the service layer owns the
//! transaction boundary.

pub mod books;
pub mod borrows;
pub mod branches;
pub mod events;
pub mod inventories;
pub mod students;
pub mod users;

use sqlx::{Pool, Postgres};

use crate::error::AppError;

/// SQLSTATE for unique_violation
const UNIQUE_VIOLATION: &str = "23505";
/// SQLSTATE for foreign_key_violation
const FOREIGN_KEY_VIOLATION: &str = "23503";
/// SQLSTATE for numeric_value_out_of_range
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub books: books::BooksRepository,
    pub branches: branches::BranchesRepository,
    pub students: students::StudentsRepository,
    pub inventories: inventories::InventoriesRepository,
    pub borrows: borrows::BorrowsRepository,
    pub events: events::EventsRepository,
    pub users: users::UsersRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            books: books::BooksRepository::new(pool.clone()),
            branches: branches::BranchesRepository::new(pool.clone()),
            students: students::StudentsRepository::new(pool.clone()),
            inventories: inventories::InventoriesRepository::new(pool.clone()),
            borrows: borrows::BorrowsRepository::new(pool.clone()),
            events: events::EventsRepository::new(pool.clone()),
            users: users::UsersRepository::new(pool.clone()),
            pool,
        }
    }
}

/// Turn constraint failures on create/update into client errors
pub(crate) fn map_constraint_error(err: sqlx::Error, what: &str) -> AppError {
    if let sqlx::Error::Database(db) = &err {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return AppError::Conflict(format!("{} already exists", what)),
            Some(FOREIGN_KEY_VIOLATION) => {
                return AppError::BadRequest(format!("{} references a missing record", what))
            }
            Some(NUMERIC_OUT_OF_RANGE) => {
                return AppError::BadRequest(format!("{} value out of range", what))
            }
            _ => {}
        }
    }
    AppError::Database(err)
}
