//! Inventory ledger endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::inventory::{CopiesSummary, Inventory, InventoryLine, InventoryWrite},
    AppState,
};

use super::AuthenticatedUser;

/// Signed change to a copy count
#[derive(Deserialize, ToSchema)]
pub struct AdjustInventoryRequest {
    pub book_id: i32,
    pub branch_id: i32,
    /// Copies added (positive) or written off (negative)
    pub delta: i32,
}

/// Inventory rows with availability
#[utoipa::path(
    get,
    path = "/inventories",
    tag = "inventories",
    responses(
        (status = 200, description = "Inventory with availability", body = Vec<InventoryLine>)
    )
)]
pub async fn list_inventories(State(state): State<AppState>) -> AppResult<Json<Vec<InventoryLine>>> {
    Ok(Json(state.services.inventory.list().await?))
}

/// Create or replace the copy count of a book at a branch
#[utoipa::path(
    put,
    path = "/inventories",
    tag = "inventories",
    security(("bearer_auth" = [])),
    request_body = InventoryWrite,
    responses(
        (status = 200, description = "Inventory updated", body = Inventory),
        (status = 422, description = "Copy count would be negative")
    )
)]
pub async fn set_inventory(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(write): Json<InventoryWrite>,
) -> AppResult<Json<Inventory>> {
    Ok(Json(state.services.inventory.set_copies(&write).await?))
}

/// Add or write off copies of a book at a branch
#[utoipa::path(
    post,
    path = "/inventories/adjust",
    tag = "inventories",
    security(("bearer_auth" = [])),
    request_body = AdjustInventoryRequest,
    responses(
        (status = 200, description = "Inventory adjusted", body = Inventory),
        (status = 404, description = "No inventory for the pair"),
        (status = 422, description = "Copy count would be negative")
    )
)]
pub async fn adjust_inventory(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(request): Json<AdjustInventoryRequest>,
) -> AppResult<Json<Inventory>> {
    let inventory = state
        .services
        .inventory
        .adjust_copies(request.book_id, request.branch_id, request.delta)
        .await?;
    Ok(Json(inventory))
}

/// Total and available copies of a book at a branch
#[utoipa::path(
    get,
    path = "/branches/{branch_id}/books/{book_id}/copies",
    tag = "inventories",
    params(
        ("branch_id" = i32, Path, description = "Branch ID"),
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Copies summary", body = CopiesSummary)
    )
)]
pub async fn copies_in_branch(
    State(state): State<AppState>,
    Path((branch_id, book_id)): Path<(i32, i32)>,
) -> AppResult<Json<CopiesSummary>> {
    Ok(Json(state.services.availability.copies_summary(book_id, branch_id).await?))
}
