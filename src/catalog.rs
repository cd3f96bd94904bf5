//! In-memory book registry.

use crate::book::Book;
use crate::error::{CirculationError, Result};
use std::collections::HashMap;

/// Books keyed by code, kept in registration order for listings.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    books: Vec<Book>,

    /// Normalized code to position in `books`.
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a book. Codes must be unique ignoring case.
    pub fn register(&mut self, book: Book) -> Result<()> {
        let key = Book::key(&book.code);
        if self.index.contains_key(&key) {
            return Err(CirculationError::DuplicateBook(book.code));
        }

        self.index.insert(key, self.books.len());
        self.books.push(book);
        Ok(())
    }

    /// Case-insensitive exact lookup.
    pub fn find_book(&self, code: &str) -> Option<&Book> {
        self.index
            .get(&Book::key(code))
            .and_then(|&pos| self.books.get(pos))
    }

    pub(crate) fn find_book_mut(&mut self, code: &str) -> Option<&mut Book> {
        let pos = *self.index.get(&Book::key(code))?;
        self.books.get_mut(pos)
    }

    /// Books currently on the shelf, in registration order.
    pub fn list_available(&self) -> Vec<&Book> {
        self.books.iter().filter(|b| b.available).collect()
    }

    /// All books in registration order.
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}
