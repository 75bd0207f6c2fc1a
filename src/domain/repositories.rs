//! Repository trait definitions
//!
//! These traits define the contract for data access.
//! Implementations live in the infrastructure layer.

use async_trait::async_trait;

use super::DomainError;
use crate::models::book::Book;

/// Editable text fields of a book record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookFields {
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub edition: Option<String>,
    pub condition: Option<String>,
    pub notes: Option<String>,
}

/// Input for inserting a record. `id` and `added_at` are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewBook {
    pub fields: BookFields,
    pub cover_url: Option<String>,
}

/// Input for updating a record.
///
/// Every text field is written. `cover_url` is only written when a new cover
/// was resolved; `None` leaves the stored cover untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookPatch {
    pub fields: BookFields,
    pub cover_url: Option<String>,
}

/// Repository trait for Book entity
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// All records, newest `added_at` first
    async fn list(&self) -> Result<Vec<Book>, DomainError>;

    /// Find a single book by ID
    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError>;

    /// Insert a new book
    async fn create(&self, book: NewBook) -> Result<Book, DomainError>;

    /// Partially update an existing book
    async fn update(&self, id: i32, patch: BookPatch) -> Result<Book, DomainError>;

    /// Delete a book by ID
    async fn delete(&self, id: i32) -> Result<(), DomainError>;
}
