//! Liveness and readiness probes

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{error::AppResult, AppState};

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    /// `healthy` or `ready`
    pub status: String,
    pub version: String,
    /// Loans not yet returned, reported by the readiness probe only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_borrows: Option<i64>,
}

impl HealthResponse {
    fn new(status: &str, open_borrows: Option<i64>) -> Self {
        Self {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            open_borrows,
        }
    }
}

/// Liveness probe, never touches the database
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Process is up", body = HealthResponse)
    )
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse::new("healthy", None))
}

/// Readiness probe. Reads the borrow ledger, so it fails until the database
/// is reachable and migrated.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Database reachable and migrated", body = HealthResponse),
        (status = 500, description = "Database unavailable")
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let open_borrows = state.services.borrows.count_open().await?;
    Ok(Json(HealthResponse::new("ready", Some(open_borrows))))
}
