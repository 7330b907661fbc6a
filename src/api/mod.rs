//! API handlers for Athenaeum REST endpoints

pub mod auth;
pub mod books;
pub mod borrows;
pub mod branches;
pub mod events;
pub mod health;
pub mod inventories;
pub mod openapi;
pub mod students;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{error::AppError, models::user::UserClaims, AppState};

/// Extractor for authenticated user from JWT token
pub struct AuthenticatedUser(pub UserClaims);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Authentication("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Authentication("Invalid authorization header format".to_string()))?;

        let claims = UserClaims::from_token(token, &state.config.auth.jwt_secret)
            .map_err(|e| AppError::Authentication(e.to_string()))?;

        Ok(AuthenticatedUser(claims))
    }
}

/// Create the application router with all routes
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        // Health check
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Authentication
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route("/books/:id", get(books::get_book).put(books::update_book))
        // Branches
        .route("/branches", get(branches::list_branches).post(branches::create_branch))
        .route("/branches/:id", get(branches::get_branch).put(branches::update_branch))
        .route(
            "/branches/:branch_id/books/:book_id/copies",
            get(inventories::copies_in_branch),
        )
        .route(
            "/branches/:branch_id/books/:book_id/faculties",
            get(branches::book_faculties).post(branches::link_book_faculty),
        )
        // Faculties and students
        .route("/faculties", get(students::list_faculties).post(students::create_faculty))
        .route("/students", get(students::list_students).post(students::create_student))
        // Inventory ledger
        .route("/inventories", get(inventories::list_inventories).put(inventories::set_inventory))
        .route("/inventories/adjust", post(inventories::adjust_inventory))
        // Borrow ledger
        .route("/borrows", get(borrows::list_borrows).post(borrows::borrow_book))
        .route("/borrows/:id", get(borrows::get_borrow))
        .route("/borrows/:id/return", post(borrows::return_borrow))
        // Audit trail
        .route("/events", get(events::list_events))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_v1)
        .merge(openapi::create_openapi_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
