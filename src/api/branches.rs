//! Branch endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    error::AppResult,
    models::branch::{BookUsage, Branch, BranchInput, LinkFaculty},
    AppState,
};

use super::AuthenticatedUser;

/// List branches
#[utoipa::path(
    get,
    path = "/branches",
    tag = "branches",
    responses(
        (status = 200, description = "List of branches", body = Vec<Branch>)
    )
)]
pub async fn list_branches(State(state): State<AppState>) -> AppResult<Json<Vec<Branch>>> {
    Ok(Json(state.services.catalog.list_branches().await?))
}

/// Get a branch
#[utoipa::path(
    get,
    path = "/branches/{id}",
    tag = "branches",
    params(
        ("id" = i32, Path, description = "Branch ID")
    ),
    responses(
        (status = 200, description = "Branch", body = Branch),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn get_branch(State(state): State<AppState>, Path(id): Path<i32>) -> AppResult<Json<Branch>> {
    Ok(Json(state.services.catalog.get_branch(id).await?))
}

/// Create a branch
#[utoipa::path(
    post,
    path = "/branches",
    tag = "branches",
    security(("bearer_auth" = [])),
    request_body = BranchInput,
    responses(
        (status = 201, description = "Branch created", body = Branch),
        (status = 409, description = "Name already exists")
    )
)]
pub async fn create_branch(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(input): Json<BranchInput>,
) -> AppResult<(StatusCode, Json<Branch>)> {
    let branch = state.services.catalog.create_branch(&input).await?;
    Ok((StatusCode::CREATED, Json(branch)))
}

/// Update a branch
#[utoipa::path(
    put,
    path = "/branches/{id}",
    tag = "branches",
    security(("bearer_auth" = [])),
    params(
        ("id" = i32, Path, description = "Branch ID")
    ),
    request_body = BranchInput,
    responses(
        (status = 200, description = "Branch updated", body = Branch),
        (status = 404, description = "Branch not found")
    )
)]
pub async fn update_branch(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i32>,
    Json(input): Json<BranchInput>,
) -> AppResult<Json<Branch>> {
    Ok(Json(state.services.catalog.update_branch(id, &input).await?))
}

/// Faculties using a book at a branch
#[utoipa::path(
    get,
    path = "/branches/{branch_id}/books/{book_id}/faculties",
    tag = "branches",
    params(
        ("branch_id" = i32, Path, description = "Branch ID"),
        ("book_id" = i32, Path, description = "Book ID")
    ),
    responses(
        (status = 200, description = "Faculties using the book", body = BookUsage)
    )
)]
pub async fn book_faculties(
    State(state): State<AppState>,
    Path((branch_id, book_id)): Path<(i32, i32)>,
) -> AppResult<Json<BookUsage>> {
    Ok(Json(state.services.catalog.book_usage(book_id, branch_id).await?))
}

/// Record that a faculty uses a book at a branch
#[utoipa::path(
    post,
    path = "/branches/{branch_id}/books/{book_id}/faculties",
    tag = "branches",
    security(("bearer_auth" = [])),
    params(
        ("branch_id" = i32, Path, description = "Branch ID"),
        ("book_id" = i32, Path, description = "Book ID")
    ),
    request_body = LinkFaculty,
    responses(
        (status = 200, description = "Faculties using the book", body = BookUsage),
        (status = 400, description = "Unknown book, branch or faculty")
    )
)]
pub async fn link_book_faculty(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path((branch_id, book_id)): Path<(i32, i32)>,
    Json(request): Json<LinkFaculty>,
) -> AppResult<Json<BookUsage>> {
    let usage = state
        .services
        .catalog
        .link_faculty(book_id, branch_id, request.faculty_id)
        .await?;
    Ok(Json(usage))
}
