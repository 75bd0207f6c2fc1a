//! Table and cover-grid view models built from a cache snapshot.

use serde::Serialize;

use super::filter::filter_books;
use super::sort::{SortColumn, SortState};
use crate::models::Book;

/// Placeholder shown for unset table cells.
pub const EMPTY_CELL: &str = "—";
pub const NO_COVER: &str = "No Cover";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub edition: String,
    pub condition: String,
    pub notes: String,
    /// Date part of `added_at`
    pub added: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnHeader {
    pub key: SortColumn,
    pub label: &'static str,
    /// Arrow for the active sort column
    pub marker: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub headers: Vec<ColumnHeader>,
    pub rows: Vec<TableRow>,
    pub sort: SortState,
    pub query: String,
    pub total: usize,
}

impl TableView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CoverImage {
    Url { url: String },
    Placeholder { label: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverCard {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub cover: CoverImage,
}

fn cell(value: &Option<String>) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(EMPTY_CELL)
        .to_string()
}

fn added_date(added_at: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(added_at)
        .map(|dt| dt.date_naive().to_string())
        .unwrap_or_else(|_| added_at.chars().take(10).collect())
}

pub fn table_row(book: &Book) -> TableRow {
    TableRow {
        id: book.id,
        title: book.title.clone(),
        author: book.author.clone(),
        isbn: cell(&book.isbn),
        edition: cell(&book.edition),
        condition: cell(&book.condition),
        notes: cell(&book.notes),
        added: added_date(&book.added_at),
    }
}

pub fn cover_card(book: &Book) -> CoverCard {
    let cover = match book.cover_url.as_deref().filter(|u| !u.is_empty()) {
        Some(url) => CoverImage::Url {
            url: url.to_string(),
        },
        None => CoverImage::Placeholder { label: NO_COVER },
    };

    CoverCard {
        id: book.id,
        title: book.title.clone(),
        author: book.author.clone(),
        isbn: book.isbn.clone(),
        cover,
    }
}

/// Filter by `query`, then sort, then render table rows.
pub fn table_view(books: &[Book], query: &str, sort: SortState) -> TableView {
    let mut visible = filter_books(books, query);
    sort.sort(&mut visible);

    let headers = SortColumn::ALL
        .iter()
        .map(|&key| ColumnHeader {
            key,
            label: key.label(),
            marker: (sort.column == Some(key)).then(|| sort.direction.arrow()),
        })
        .collect();

    TableView {
        headers,
        rows: visible.into_iter().map(table_row).collect(),
        sort,
        query: query.trim().to_string(),
        total: books.len(),
    }
}

/// Cover grid in store order, filtered by `query`.
pub fn grid_view(books: &[Book], query: &str) -> Vec<CoverCard> {
    filter_books(books, query).into_iter().map(cover_card).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::sort::SortDirection;
    use crate::views::test_support::book;

    #[test]
    fn test_table_row_placeholders_and_date() {
        let mut b = book(1, "Dune", "Frank Herbert", None);
        b.added_at = "2024-03-01T22:15:00+00:00".to_string();
        b.condition = Some("Good".to_string());

        let row = table_row(&b);
        assert_eq!(row.isbn, EMPTY_CELL);
        assert_eq!(row.edition, EMPTY_CELL);
        assert_eq!(row.condition, "Good");
        assert_eq!(row.added, "2024-03-01");
    }

    #[test]
    fn test_cover_card_placeholder() {
        let mut with_cover = book(1, "Dune", "Frank Herbert", None);
        with_cover.cover_url = Some("https://covers.openlibrary.org/b/id/1-L.jpg".to_string());
        let without = book(2, "Emma", "Jane Austen", None);

        assert!(matches!(cover_card(&with_cover).cover, CoverImage::Url { .. }));
        assert_eq!(
            cover_card(&without).cover,
            CoverImage::Placeholder { label: NO_COVER }
        );
    }

    #[test]
    fn test_table_view_filters_then_sorts_and_marks_header() {
        let books = vec![
            book(1, "Persuasion", "Jane Austen", None),
            book(2, "Dune", "Frank Herbert", None),
            book(3, "Emma", "Jane Austen", None),
        ];
        let view = table_view(
            &books,
            " austen ",
            SortState::new(SortColumn::Title, SortDirection::Asc),
        );

        let titles: Vec<&str> = view.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["Emma", "Persuasion"]);
        assert_eq!(view.total, 3);
        assert_eq!(view.query, "austen");

        let title_header = view.headers.iter().find(|h| h.key == SortColumn::Title).unwrap();
        assert_eq!(title_header.marker, Some("▲"));
        assert!(view.headers.iter().filter(|h| h.marker.is_some()).count() == 1);
    }

    #[test]
    fn test_grid_view_keeps_store_order() {
        let books = vec![
            book(3, "Emma", "Jane Austen", None),
            book(1, "Dune", "Frank Herbert", None),
        ];
        let ids: Vec<i32> = grid_view(&books, "").iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert!(grid_view(&books, "zzz").is_empty());
    }
}
