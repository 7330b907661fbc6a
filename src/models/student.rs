//! Student model

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Student {
    pub id: i32,
    pub full_name: String,
    pub faculty_id: i32,
}

/// Student list entry with faculty name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct StudentShort {
    pub id: i32,
    pub full_name: String,
    pub faculty: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStudent {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    pub faculty_id: i32,
}
