//! Book model.

use serde::Serialize;

/// A catalogued book.
///
/// `available` is false exactly while one outstanding loan references the code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Book {
    /// Unique code, matched case-insensitively.
    pub code: String,

    pub title: String,

    pub category: String,

    /// Whether the book is on the shelf.
    pub available: bool,
}

impl Book {
    /// Creates an available book.
    pub fn new(
        code: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Book {
            code: code.into(),
            title: title.into(),
            category: category.into(),
            available: true,
        }
    }

    /// Returns the normalized lookup key for a book code.
    pub fn key(code: &str) -> String {
        code.trim().to_uppercase()
    }
}
