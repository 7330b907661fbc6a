//! Books repository: catalog rows, publishers and authors

use sqlx::{PgConnection, Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookInput, BookShort},
};

use super::map_constraint_error;

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List books ordered by title, with publisher name
    pub async fn list(&self) -> AppResult<Vec<BookShort>> {
        let books = sqlx::query_as::<_, BookShort>(
            r#"
            SELECT b.id, b.title, b.year, b.pages, b.illustrations, b.price, p.name AS publisher
            FROM books b
            LEFT JOIN publishers p ON p.id = b.publisher_id
            ORDER BY b.title
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(books)
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Publisher name of a book, if any
    pub async fn publisher_name(&self, book: &Book) -> AppResult<Option<String>> {
        let Some(publisher_id) = book.publisher_id else {
            return Ok(None);
        };
        let name = sqlx::query_scalar::<_, String>("SELECT name FROM publishers WHERE id = $1")
            .bind(publisher_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(name)
    }

    /// Author names of a book, alphabetical
    pub async fn author_names(&self, book_id: i32) -> AppResult<Vec<String>> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT a.full_name
            FROM authors a
            JOIN book_authors ba ON ba.author_id = a.id
            WHERE ba.book_id = $1
            ORDER BY a.full_name
            "#,
        )
        .bind(book_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(names)
    }

    /// Title of a book, `None` if it does not exist
    pub async fn title(&self, id: i32) -> AppResult<Option<String>> {
        let title = sqlx::query_scalar::<_, String>("SELECT title FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(title)
    }

    /// Resolve a publisher by name, creating it on first use
    pub async fn get_or_create_publisher(&self, conn: &mut PgConnection, name: &str) -> AppResult<i32> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO publishers (name) VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(name)
        .fetch_one(&mut *conn)
        .await?;
        Ok(id)
    }

    /// Resolve an author by full name, creating it on first use
    pub async fn get_or_create_author(&self, conn: &mut PgConnection, full_name: &str) -> AppResult<i32> {
        let existing = sqlx::query_scalar::<_, i32>(
            "SELECT id FROM authors WHERE full_name = $1 ORDER BY id LIMIT 1",
        )
        .bind(full_name)
        .fetch_optional(&mut *conn)
        .await?;

        if let Some(id) = existing {
            return Ok(id);
        }

        let id = sqlx::query_scalar::<_, i32>("INSERT INTO authors (full_name) VALUES ($1) RETURNING id")
            .bind(full_name)
            .fetch_one(&mut *conn)
            .await?;
        Ok(id)
    }

    /// Insert a book row
    pub async fn insert(&self, conn: &mut PgConnection, input: &BookInput, publisher_id: Option<i32>) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, publisher_id, year, pages, illustrations, price)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(input.title.trim())
        .bind(publisher_id)
        .bind(input.year)
        .bind(input.pages)
        .bind(input.illustrations.unwrap_or(0))
        .bind(input.price)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| map_constraint_error(e, "Book"))
    }

    /// Overwrite a book row
    pub async fn update(&self, conn: &mut PgConnection, id: i32, input: &BookInput, publisher_id: Option<i32>) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = $2, publisher_id = $3, year = $4, pages = $5, illustrations = $6, price = $7
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(input.title.trim())
        .bind(publisher_id)
        .bind(input.year)
        .bind(input.pages)
        .bind(input.illustrations.unwrap_or(0))
        .bind(input.price)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| map_constraint_error(e, "Book"))?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Replace the author list of a book
    pub async fn set_authors(&self, conn: &mut PgConnection, book_id: i32, author_ids: &[i32]) -> AppResult<()> {
        sqlx::query("DELETE FROM book_authors WHERE book_id = $1")
            .bind(book_id)
            .execute(&mut *conn)
            .await?;

        for author_id in author_ids {
            sqlx::query(
                "INSERT INTO book_authors (book_id, author_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(book_id)
            .bind(author_id)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }
}
