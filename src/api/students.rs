//! Faculty and student endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{
        branch::{CreateFaculty, Faculty},
        student::{CreateStudent, Student, StudentShort},
    },
    AppState,
};

use super::AuthenticatedUser;

/// List faculties
#[utoipa::path(
    get,
    path = "/faculties",
    tag = "students",
    responses(
        (status = 200, description = "List of faculties", body = Vec<Faculty>)
    )
)]
pub async fn list_faculties(State(state): State<AppState>) -> AppResult<Json<Vec<Faculty>>> {
    Ok(Json(state.services.catalog.list_faculties().await?))
}

/// Create a faculty
#[utoipa::path(
    post,
    path = "/faculties",
    tag = "students",
    security(("bearer_auth" = [])),
    request_body = CreateFaculty,
    responses(
        (status = 201, description = "Faculty created", body = Faculty),
        (status = 409, description = "Name already exists")
    )
)]
pub async fn create_faculty(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(input): Json<CreateFaculty>,
) -> AppResult<(StatusCode, Json<Faculty>)> {
    let faculty = state.services.catalog.create_faculty(&input).await?;
    Ok((StatusCode::CREATED, Json(faculty)))
}

/// List students with their faculty
#[utoipa::path(
    get,
    path = "/students",
    tag = "students",
    responses(
        (status = 200, description = "List of students", body = Vec<StudentShort>)
    )
)]
pub async fn list_students(State(state): State<AppState>) -> AppResult<Json<Vec<StudentShort>>> {
    Ok(Json(state.services.catalog.list_students().await?))
}

/// Create a student
#[utoipa::path(
    post,
    path = "/students",
    tag = "students",
    security(("bearer_auth" = [])),
    request_body = CreateStudent,
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Invalid input or unknown faculty")
    )
)]
pub async fn create_student(
    State(state): State<AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(input): Json<CreateStudent>,
) -> AppResult<(StatusCode, Json<Student>)> {
    let student = state.services.catalog.create_student(&input).await?;
    Ok((StatusCode::CREATED, Json(student)))
}
