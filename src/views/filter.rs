use crate::models::Book;

/// Case-insensitive substring match on title, author and ISBN.
pub fn matches(book: &Book, query: &str) -> bool {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return true;
    }
    book.title.to_lowercase().contains(&q)
        || book.author.to_lowercase().contains(&q)
        || book
            .isbn
            .as_deref()
            .is_some_and(|isbn| isbn.to_lowercase().contains(&q))
}

/// Books matching `query`, in their original order. A blank query keeps all.
pub fn filter_books<'a>(books: &'a [Book], query: &str) -> Vec<&'a Book> {
    books.iter().filter(|book| matches(book, query)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::test_support::book;

    fn shelf() -> Vec<Book> {
        vec![
            book(1, "Dune", "Frank Herbert", Some("9780441013593")),
            book(2, "Emma", "Jane Austen", None),
            book(3, "Persuasion", "Jane Austen", Some("9780141439686")),
        ]
    }

    #[test]
    fn test_empty_query_returns_everything_in_order() {
        let books = shelf();
        let ids: Vec<i32> = filter_books(&books, "   ").iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_matches_title_author_and_isbn_case_insensitively() {
        let books = shelf();
        let ids = |q: &str| filter_books(&books, q).iter().map(|b| b.id).collect::<Vec<_>>();

        assert_eq!(ids("dUNE"), vec![1]);
        assert_eq!(ids("austen"), vec![2, 3]);
        assert_eq!(ids("439686"), vec![3]);
    }

    #[test]
    fn test_no_match_returns_empty() {
        let books = shelf();
        assert!(filter_books(&books, "tolkien").is_empty());
    }
}
