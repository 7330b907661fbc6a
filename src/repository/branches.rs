//! Branches and faculties repository

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::branch::{Branch, BranchInput, Faculty},
};

use super::map_constraint_error;

#[derive(Clone)]
pub struct BranchesRepository {
    pool: Pool<Postgres>,
}

impl BranchesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List branches ordered by name
    pub async fn list(&self) -> AppResult<Vec<Branch>> {
        let branches = sqlx::query_as::<_, Branch>("SELECT * FROM branches ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(branches)
    }

    /// Get branch by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Branch> {
        sqlx::query_as::<_, Branch>("SELECT * FROM branches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Branch with id {} not found", id)))
    }

    /// Name of a branch, `None` if it does not exist
    pub async fn name(&self, id: i32) -> AppResult<Option<String>> {
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM branches WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    pub async fn create(&self, input: &BranchInput) -> AppResult<Branch> {
        sqlx::query_as::<_, Branch>(
            "INSERT INTO branches (name, address) VALUES ($1, $2) RETURNING *",
        )
        .bind(input.name.trim())
        .bind(&input.address)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Branch"))
    }

    pub async fn update(&self, id: i32, input: &BranchInput) -> AppResult<Branch> {
        sqlx::query_as::<_, Branch>(
            "UPDATE branches SET name = $2, address = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(input.name.trim())
        .bind(&input.address)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Branch"))?
        .ok_or_else(|| AppError::NotFound(format!("Branch with id {} not found", id)))
    }

    /// List faculties ordered by name
    pub async fn list_faculties(&self) -> AppResult<Vec<Faculty>> {
        let faculties = sqlx::query_as::<_, Faculty>("SELECT * FROM faculties ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(faculties)
    }

    pub async fn create_faculty(&self, name: &str) -> AppResult<Faculty> {
        sqlx::query_as::<_, Faculty>("INSERT INTO faculties (name) VALUES ($1) RETURNING *")
            .bind(name.trim())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, "Faculty"))
    }

    /// Names of faculties using a book at a branch
    pub async fn book_faculties(&self, book_id: i32, branch_id: i32) -> AppResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT f.name
            FROM faculties f
            JOIN book_faculties bf ON bf.faculty_id = f.id
            WHERE bf.book_id = $1 AND bf.branch_id = $2
            ORDER BY f.name
            "#,
        )
        .bind(book_id)
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Record that a faculty uses a book at a branch
    pub async fn link_faculty(&self, book_id: i32, branch_id: i32, faculty_id: i32) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO book_faculties (book_id, faculty_id, branch_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(book_id)
        .bind(faculty_id)
        .bind(branch_id)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint_error(e, "Book faculty link"))?;
        Ok(())
    }
}
