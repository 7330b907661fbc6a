//! Borrow and return endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::borrow::{Borrow, BorrowLine, CreateBorrow, ReturnOutcome},
    AppState,
};

use super::AuthenticatedUser;

/// Return response. `status` is `returned` or `warning`.
#[derive(Serialize, ToSchema)]
pub struct ReturnResponse {
    pub status: String,
    pub message: String,
    pub borrow: Option<Borrow>,
}

impl From<ReturnOutcome> for ReturnResponse {
    fn from(outcome: ReturnOutcome) -> Self {
        let status = if outcome.is_warning() { "warning" } else { "returned" };
        let message = outcome.message();
        let borrow = match outcome {
            ReturnOutcome::Returned(b) | ReturnOutcome::AlreadyReturned(b) => Some(b),
            ReturnOutcome::NotFound(_) => None,
        };
        Self {
            status: status.to_string(),
            message,
            borrow,
        }
    }
}

/// List borrows, most recent first
#[utoipa::path(
    get,
    path = "/borrows",
    tag = "borrows",
    responses(
        (status = 200, description = "Borrow ledger", body = Vec<BorrowLine>)
    )
)]
pub async fn list_borrows(State(state): State<AppState>) -> AppResult<Json<Vec<BorrowLine>>> {
    Ok(Json(state.services.borrows.list().await?))
}

/// Get a borrow
#[utoipa::path(
    get,
    path = "/borrows/{id}",
    tag = "borrows",
    params(
        ("id" = i32, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Borrow", body = Borrow),
        (status = 404, description = "Borrow not found")
    )
)]
pub async fn get_borrow(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Borrow>> {
    Ok(Json(state.services.borrows.get(id).await?))
}

/// Lend a copy of a book at a branch to a student
#[utoipa::path(
    post,
    path = "/borrows",
    tag = "borrows",
    security(("bearer_auth" = [])),
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Borrow recorded", body = Borrow),
        (status = 400, description = "Unknown student, book or branch"),
        (status = 409, description = "No copies available")
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(request): Json<CreateBorrow>,
) -> AppResult<(StatusCode, Json<Borrow>)> {
    let borrow = state
        .services
        .borrows
        .borrow_book(request.student_id, request.book_id, request.branch_id)
        .await?;
    Ok((StatusCode::CREATED, Json(borrow)))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/borrows/{id}/return",
    tag = "borrows",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Borrow ID")
    ),
    responses(
        (status = 200, description = "Returned, or warning if already returned or missing", body = ReturnResponse)
    )
)]
pub async fn return_borrow(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
) -> AppResult<Json<ReturnResponse>> {
    let outcome = state.services.borrows.return_borrow(id).await?;
    Ok(Json(outcome.into()))
}
