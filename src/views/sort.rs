use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::Book;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Title,
    Author,
    Isbn,
    Edition,
    Condition,
    Notes,
    AddedAt,
}

impl SortColumn {
    pub const ALL: [SortColumn; 7] = [
        SortColumn::Title,
        SortColumn::Author,
        SortColumn::Isbn,
        SortColumn::Edition,
        SortColumn::Condition,
        SortColumn::Notes,
        SortColumn::AddedAt,
    ];

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "title" => Some(SortColumn::Title),
            "author" => Some(SortColumn::Author),
            "isbn" => Some(SortColumn::Isbn),
            "edition" => Some(SortColumn::Edition),
            "condition" => Some(SortColumn::Condition),
            "notes" => Some(SortColumn::Notes),
            "added_at" | "added" => Some(SortColumn::AddedAt),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortColumn::Title => "Title",
            SortColumn::Author => "Author",
            SortColumn::Isbn => "ISBN",
            SortColumn::Edition => "Edition",
            SortColumn::Condition => "Condition",
            SortColumn::Notes => "Notes",
            SortColumn::AddedAt => "Added",
        }
    }

    /// Sort key; unset fields sort as an empty string.
    fn value<'a>(&self, book: &'a Book) -> &'a str {
        match self {
            SortColumn::Title => &book.title,
            SortColumn::Author => &book.author,
            SortColumn::Isbn => book.isbn.as_deref().unwrap_or(""),
            SortColumn::Edition => book.edition.as_deref().unwrap_or(""),
            SortColumn::Condition => book.condition.as_deref().unwrap_or(""),
            SortColumn::Notes => book.notes.as_deref().unwrap_or(""),
            SortColumn::AddedAt => &book.added_at,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Header marker shown next to the active column.
    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

/// Column sort selected in the table header. No column means store order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub column: Option<SortColumn>,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(column: SortColumn, direction: SortDirection) -> Self {
        Self {
            column: Some(column),
            direction,
        }
    }

    /// Header click: the active column flips direction, another column
    /// becomes active ascending.
    pub fn select(&mut self, column: SortColumn) {
        if self.column == Some(column) {
            self.direction = self.direction.toggled();
        } else {
            self.column = Some(column);
            self.direction = SortDirection::Asc;
        }
    }

    pub fn compare(&self, a: &Book, b: &Book) -> Ordering {
        let Some(column) = self.column else {
            return Ordering::Equal;
        };
        let ord = column.value(a).cmp(column.value(b));
        match self.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    }

    /// Stable sort of `books` in place.
    pub fn sort(&self, books: &mut [&Book]) {
        if self.column.is_some() {
            books.sort_by(|a, b| self.compare(a, b));
        }
    }
}

/// Sorted view over `books`; the input slice is left untouched.
pub fn sort_books<'a>(books: &'a [Book], state: &SortState) -> Vec<&'a Book> {
    let mut sorted: Vec<&Book> = books.iter().collect();
    state.sort(&mut sorted);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::book;

    fn shelf() -> Vec<Book> {
        let mut books = vec![
            book(1, "Dune", "Frank Herbert", Some("9780441013593")),
            book(2, "Emma", "Jane Austen", None),
            book(3, "Persuasion", "Jane Austen", Some("9780141439686")),
            book(4, "Anathem", "Neal Stephenson", None),
        ];
        books[0].edition = Some("First".to_string());
        books
    }

    fn ids(books: &[&Book]) -> Vec<i32> {
        books.iter().map(|b| b.id).collect()
    }

    #[test]
    fn test_select_toggles_same_column_and_resets_on_new_column() {
        let mut state = SortState::default();
        state.select(SortColumn::Title);
        assert_eq!(state, SortState::new(SortColumn::Title, SortDirection::Asc));
        state.select(SortColumn::Title);
        assert_eq!(state.direction, SortDirection::Desc);
        state.select(SortColumn::Author);
        assert_eq!(state, SortState::new(SortColumn::Author, SortDirection::Asc));
    }

    #[test]
    fn test_sort_by_title_both_directions() {
        let books = shelf();
        let mut state = SortState::default();
        state.select(SortColumn::Title);
        assert_eq!(ids(&sort_books(&books, &state)), vec![4, 1, 2, 3]);
        state.select(SortColumn::Title);
        assert_eq!(ids(&sort_books(&books, &state)), vec![3, 2, 1, 4]);
    }

    #[test]
    fn test_toggling_twice_restores_order() {
        let books = shelf();
        for column in SortColumn::ALL {
            let mut state = SortState::default();
            state.select(column);
            let before = ids(&sort_books(&books, &state));
            state.select(column);
            state.select(column);
            assert_eq!(ids(&sort_books(&books, &state)), before, "column {:?}", column);
        }
    }

    #[test]
    fn test_sort_is_stable_and_unset_fields_sort_first() {
        let books = shelf();
        let mut state = SortState::default();
        state.select(SortColumn::Author);
        // Emma and Persuasion share an author and keep their relative order.
        assert_eq!(ids(&sort_books(&books, &state)), vec![1, 2, 3, 4]);

        state.select(SortColumn::Isbn);
        assert_eq!(ids(&sort_books(&books, &state)), vec![2, 4, 3, 1]);

        state.select(SortColumn::Edition);
        assert_eq!(ids(&sort_books(&books, &state)), vec![2, 3, 4, 1]);
    }

    #[test]
    fn test_no_column_keeps_store_order() {
        let books = shelf();
        assert_eq!(ids(&sort_books(&books, &SortState::default())), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse() {
        assert_eq!(SortColumn::parse("Added_At"), Some(SortColumn::AddedAt));
        assert_eq!(SortColumn::parse("publisher"), None);
        assert_eq!(SortDirection::parse("DESC"), Some(SortDirection::Desc));
    }
}
