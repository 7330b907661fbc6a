//! Book catalog model: books, publishers and authors

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book row from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub publisher_id: Option<i32>,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    pub illustrations: i32,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
}

/// Book list entry with publisher name
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct BookShort {
    pub id: i32,
    pub title: String,
    pub year: Option<i32>,
    pub pages: Option<i32>,
    pub illustrations: i32,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    pub publisher: Option<String>,
}

/// Book with resolved publisher and author names
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookDetails {
    #[serde(flatten)]
    pub book: Book,
    pub publisher: Option<String>,
    pub authors: Vec<String>,
}

/// Create or update book request
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BookInput {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    /// Publisher name, created on first use
    pub publisher: Option<String>,
    #[validate(range(min = 1500, max = 2100, message = "Year must be between 1500 and 2100"))]
    pub year: Option<i32>,
    #[validate(range(min = 1, message = "Pages must be at least 1"))]
    pub pages: Option<i32>,
    #[validate(range(min = 0, message = "Illustrations cannot be negative"))]
    pub illustrations: Option<i32>,
    #[schema(value_type = Option<String>)]
    pub price: Option<Decimal>,
    /// Author full names, created on first use
    #[serde(default)]
    pub authors: Vec<String>,
}

impl BookInput {
    /// Validate field ranges, including the price which `validator` cannot range-check
    pub fn check(&self) -> Result<(), crate::error::AppError> {
        self.validate()
            .map_err(|e| crate::error::AppError::Validation(e.to_string()))?;
        if self.price.is_some_and(|p| p.is_sign_negative()) {
            return Err(crate::error::AppError::Validation(
                "Price cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Trimmed, de-duplicated, non-empty author names in submission order
    pub fn author_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in self.authors.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    /// Trimmed publisher name, `None` when blank
    pub fn publisher_name(&self) -> Option<&str> {
        self.publisher.as_deref().map(str::trim).filter(|p| !p.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Publisher {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Author {
    pub id: i32,
    pub full_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> BookInput {
        BookInput {
            title: "Quantum Mechanics".to_string(),
            publisher: Some("  Science  ".to_string()),
            year: Some(2018),
            pages: Some(520),
            illustrations: Some(40),
            price: Some(Decimal::new(125000, 2)),
            authors: vec![
                "Ivanov I.I.".to_string(),
                " ".to_string(),
                "Petrov P.P.".to_string(),
                "Ivanov I.I.".to_string(),
            ],
        }
    }

    #[test]
    fn test_author_names_are_cleaned() {
        assert_eq!(input().author_names(), vec!["Ivanov I.I.", "Petrov P.P."]);
    }

    #[test]
    fn test_publisher_name_trimmed() {
        assert_eq!(input().publisher_name(), Some("Science"));
        let blank = BookInput { publisher: Some("   ".into()), ..input() };
        assert_eq!(blank.publisher_name(), None);
    }

    #[test]
    fn test_check_rejects_out_of_range() {
        assert!(input().check().is_ok());
        assert!(BookInput { year: Some(1200), ..input() }.check().is_err());
        assert!(BookInput { pages: Some(0), ..input() }.check().is_err());
        assert!(BookInput { price: Some(Decimal::new(-1, 0)), ..input() }.check().is_err());
        assert!(BookInput { title: String::new(), ..input() }.check().is_err());
    }
}
