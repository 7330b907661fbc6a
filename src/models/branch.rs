//! Branch and faculty models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Physical library branch
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Branch {
    pub id: i32,
    pub name: String,
    pub address: Option<String>,
}

/// Create or update branch request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BranchInput {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Faculty {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateFaculty {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
}

/// Faculties using a book at a branch
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookUsage {
    pub book_title: Option<String>,
    pub branch_name: Option<String>,
    pub count: i64,
    pub faculties: Vec<String>,
}

/// Link a faculty to a book at a branch
#[derive(Debug, Deserialize, ToSchema)]
pub struct LinkFaculty {
    pub faculty_id: i32,
}
