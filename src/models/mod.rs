//! Data models for Athenaeum

pub mod book;
pub mod borrow;
pub mod branch;
pub mod event_log;
pub mod inventory;
pub mod student;
pub mod user;

// Re-export commonly used types
pub use book::{Book, BookDetails, BookShort};
pub use borrow::{Borrow, ReturnOutcome};
pub use branch::{Branch, Faculty};
pub use event_log::{EventKind, EventLogEntry};
pub use inventory::{Availability, Inventory};
pub use student::Student;
pub use user::{User, UserClaims};
