//! Catalog service: books, branches, faculties and students

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        book::{Book, BookDetails, BookInput, BookShort},
        branch::{BookUsage, Branch, BranchInput, CreateFaculty, Faculty},
        student::{CreateStudent, Student, StudentShort},
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list_books(&self) -> AppResult<Vec<BookShort>> {
        self.repository.books.list().await
    }

    /// Book with its publisher and author names
    pub async fn get_book(&self, id: i32) -> AppResult<BookDetails> {
        let book = self.repository.books.get_by_id(id).await?;
        self.details(book).await
    }

    /// Create a book, resolving publisher and authors by name
    pub async fn create_book(&self, input: &BookInput) -> AppResult<BookDetails> {
        input.check()?;

        let mut tx = self.repository.pool.begin().await?;
        let publisher_id = match input.publisher_name() {
            Some(name) => Some(self.repository.books.get_or_create_publisher(&mut tx, name).await?),
            None => None,
        };
        let book = self.repository.books.insert(&mut tx, input, publisher_id).await?;
        self.attach_authors(&mut tx, book.id, input).await?;
        tx.commit().await?;

        tracing::info!(book_id = book.id, title = %book.title, "book created");
        self.details(book).await
    }

    /// Overwrite a book. The author list is replaced.
    pub async fn update_book(&self, id: i32, input: &BookInput) -> AppResult<BookDetails> {
        input.check()?;

        let mut tx = self.repository.pool.begin().await?;
        let publisher_id = match input.publisher_name() {
            Some(name) => Some(self.repository.books.get_or_create_publisher(&mut tx, name).await?),
            None => None,
        };
        let book = self.repository.books.update(&mut tx, id, input, publisher_id).await?;
        self.attach_authors(&mut tx, book.id, input).await?;
        tx.commit().await?;

        tracing::info!(book_id = book.id, "book updated");
        self.details(book).await
    }

    async fn attach_authors(&self, conn: &mut sqlx::PgConnection, book_id: i32, input: &BookInput) -> AppResult<()> {
        let mut author_ids = Vec::new();
        for name in input.author_names() {
            author_ids.push(self.repository.books.get_or_create_author(conn, &name).await?);
        }
        self.repository.books.set_authors(conn, book_id, &author_ids).await
    }

    async fn details(&self, book: Book) -> AppResult<BookDetails> {
        let publisher = self.repository.books.publisher_name(&book).await?;
        let authors = self.repository.books.author_names(book.id).await?;
        Ok(BookDetails {
            book,
            publisher,
            authors,
        })
    }

    pub async fn list_branches(&self) -> AppResult<Vec<Branch>> {
        self.repository.branches.list().await
    }

    pub async fn get_branch(&self, id: i32) -> AppResult<Branch> {
        self.repository.branches.get_by_id(id).await
    }

    pub async fn create_branch(&self, input: &BranchInput) -> AppResult<Branch> {
        input.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.branches.create(input).await
    }

    pub async fn update_branch(&self, id: i32, input: &BranchInput) -> AppResult<Branch> {
        input.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.branches.update(id, input).await
    }

    pub async fn list_faculties(&self) -> AppResult<Vec<Faculty>> {
        self.repository.branches.list_faculties().await
    }

    pub async fn create_faculty(&self, input: &CreateFaculty) -> AppResult<Faculty> {
        input.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.branches.create_faculty(&input.name).await
    }

    /// Faculties using a book at a branch
    pub async fn book_usage(&self, book_id: i32, branch_id: i32) -> AppResult<BookUsage> {
        let faculties = self.repository.branches.book_faculties(book_id, branch_id).await?;
        Ok(BookUsage {
            book_title: self.repository.books.title(book_id).await?,
            branch_name: self.repository.branches.name(branch_id).await?,
            count: faculties.len() as i64,
            faculties,
        })
    }

    pub async fn link_faculty(&self, book_id: i32, branch_id: i32, faculty_id: i32) -> AppResult<BookUsage> {
        self.repository
            .branches
            .link_faculty(book_id, branch_id, faculty_id)
            .await?;
        self.book_usage(book_id, branch_id).await
    }

    pub async fn list_students(&self) -> AppResult<Vec<StudentShort>> {
        self.repository.students.list().await
    }

    pub async fn create_student(&self, input: &CreateStudent) -> AppResult<Student> {
        input.validate().map_err(|e| AppError::Validation(e.to_string()))?;
        self.repository.students.create(input).await
    }
}
