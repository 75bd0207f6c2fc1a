//! Services Layer
//!
//! This module contains pure business logic extracted from HTTP handlers.

pub mod book_service;
pub mod cache;
pub mod cover_service;

// Re-export for convenience
pub use book_service::{BookService, validate};
pub use cache::{BOOKS_QUERY_KEY, BookCache, CacheEvent};
pub use cover_service::{
    CoverConverter, CoverError, CoverService, ImageCrateConverter, default_converter,
};
