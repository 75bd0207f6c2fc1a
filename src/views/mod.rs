//! View layer: pure presentation over a cached record snapshot.

pub mod filter;
pub mod form;
pub mod render;
pub mod search_box;
pub mod sort;

pub use filter::{filter_books, matches};
pub use form::{DeleteConfirmation, EditSession, delete_prompt};
pub use render::{CoverCard, CoverImage, TableRow, TableView, grid_view, table_view};
pub use search_box::{Debouncer, SearchBox};
pub use sort::{SortColumn, SortDirection, SortState, sort_books};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::models::Book;

    pub fn book(id: i32, title: &str, author: &str, isbn: Option<&str>) -> Book {
        Book {
            id,
            isbn: isbn.map(str::to_string),
            title: title.to_string(),
            author: author.to_string(),
            edition: None,
            condition: None,
            notes: None,
            cover_url: None,
            added_at: format!("2024-01-{:02}T12:00:00+00:00", id),
        }
    }
}
