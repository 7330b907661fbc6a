//! OpenAPI documentation

use axum::Router;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, borrows, branches, events, health, inventories, students};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Athenaeum API",
        version = "0.1.0",
        description = "Branch library records REST API"
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::register,
        auth::login,
        auth::me,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        // Branches
        branches::list_branches,
        branches::get_branch,
        branches::create_branch,
        branches::update_branch,
        branches::book_faculties,
        branches::link_book_faculty,
        // Students
        students::list_faculties,
        students::create_faculty,
        students::list_students,
        students::create_student,
        // Inventories
        inventories::list_inventories,
        inventories::set_inventory,
        inventories::adjust_inventory,
        inventories::copies_in_branch,
        // Borrows
        borrows::list_borrows,
        borrows::get_borrow,
        borrows::borrow_book,
        borrows::return_borrow,
        // Events
        events::list_events,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            crate::models::user::RegisterUser,
            crate::models::user::UserInfo,
            // Books
            crate::models::book::Book,
            crate::models::book::BookShort,
            crate::models::book::BookDetails,
            crate::models::book::BookInput,
            // Branches and students
            crate::models::branch::Branch,
            crate::models::branch::BranchInput,
            crate::models::branch::Faculty,
            crate::models::branch::CreateFaculty,
            crate::models::branch::BookUsage,
            crate::models::branch::LinkFaculty,
            crate::models::student::Student,
            crate::models::student::StudentShort,
            crate::models::student::CreateStudent,
            // Inventories
            crate::models::inventory::Inventory,
            crate::models::inventory::InventoryWrite,
            crate::models::inventory::InventoryLine,
            crate::models::inventory::CopiesSummary,
            inventories::AdjustInventoryRequest,
            // Borrows
            crate::models::borrow::Borrow,
            crate::models::borrow::BorrowLine,
            crate::models::borrow::CreateBorrow,
            borrows::ReturnResponse,
            // Events
            crate::models::event_log::EventLogEntry,
            events::EventPageResponse,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "books", description = "Book catalog"),
        (name = "branches", description = "Branches and book usage by faculty"),
        (name = "students", description = "Faculties and students"),
        (name = "inventories", description = "Copies per branch and availability"),
        (name = "borrows", description = "Borrowing and returns"),
        (name = "events", description = "Audit trail")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer_auth` scheme referenced by secured paths
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_core_paths() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        assert!(paths.iter().any(|p| p.as_str() == "/borrows"));
        assert!(paths.iter().any(|p| p.as_str() == "/borrows/{id}/return"));
        assert!(paths.iter().any(|p| p.as_str() == "/inventories"));
        assert!(paths.iter().any(|p| p.as_str() == "/events"));
    }

    #[test]
    fn test_openapi_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
