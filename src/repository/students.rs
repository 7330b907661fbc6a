//! Students repository

use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::student::{CreateStudent, Student, StudentShort},
};

use super::map_constraint_error;

#[derive(Clone)]
pub struct StudentsRepository {
    pool: Pool<Postgres>,
}

impl StudentsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List students ordered by name, with faculty name
    pub async fn list(&self) -> AppResult<Vec<StudentShort>> {
        let students = sqlx::query_as::<_, StudentShort>(
            r#"
            SELECT s.id, s.full_name, f.name AS faculty
            FROM students s
            JOIN faculties f ON f.id = s.faculty_id
            ORDER BY s.full_name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(students)
    }

    pub async fn create(&self, input: &CreateStudent) -> AppResult<Student> {
        sqlx::query_as::<_, Student>(
            "INSERT INTO students (full_name, faculty_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(input.full_name.trim())
        .bind(input.faculty_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Student"))
    }
}
