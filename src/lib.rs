//! Athenaeum branch library records server
//!
//! A REST JSON API over a Postgres store that tracks the book catalog,
//! copies held per branch, student borrows and an append-only audit trail.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
