//! SeaORM implementation of BookRepository

use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use crate::domain::{BookFields, BookPatch, BookRepository, DomainError, NewBook};
use crate::models::Book;
use crate::models::book::{ActiveModel, Column, Entity as BookEntity};

/// SeaORM-based implementation of BookRepository
pub struct SeaOrmBookRepository {
    db: DatabaseConnection,
}

impl SeaOrmBookRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn apply_fields(active: &mut ActiveModel, fields: BookFields) {
    active.isbn = Set(fields.isbn);
    active.title = Set(fields.title);
    active.author = Set(fields.author);
    active.edition = Set(fields.edition);
    active.condition = Set(fields.condition);
    active.notes = Set(fields.notes);
}

fn check_required(fields: &BookFields) -> Result<(), DomainError> {
    let mut errors = crate::domain::FieldErrors::new();
    if fields.title.trim().is_empty() {
        errors.add("title", "Title is required");
    }
    if fields.author.trim().is_empty() {
        errors.add("author", "Author is required");
    }
    errors.into_result().map_err(DomainError::Validation)
}

#[async_trait]
impl BookRepository for SeaOrmBookRepository {
    async fn list(&self) -> Result<Vec<Book>, DomainError> {
        let books = BookEntity::find()
            .order_by_desc(Column::AddedAt)
            .order_by_desc(Column::Id)
            .all(&self.db)
            .await?;

        tracing::debug!("DB query returned {} books", books.len());
        Ok(books.into_iter().map(Book::from).collect())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Book>, DomainError> {
        let book = BookEntity::find_by_id(id).one(&self.db).await?;
        Ok(book.map(Book::from))
    }

    async fn create(&self, book: NewBook) -> Result<Book, DomainError> {
        check_required(&book.fields)?;

        let mut active = ActiveModel {
            cover_url: Set(book.cover_url),
            added_at: Set(chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)),
            ..Default::default()
        };
        apply_fields(&mut active, book.fields);

        let result = active.insert(&self.db).await?;
        tracing::info!("Inserted book {} ({:?})", result.id, result.title);
        Ok(Book::from(result))
    }

    async fn update(&self, id: i32, patch: BookPatch) -> Result<Book, DomainError> {
        check_required(&patch.fields)?;

        let existing = BookEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(DomainError::NotFound)?;

        let mut active: ActiveModel = existing.into();
        apply_fields(&mut active, patch.fields);
        if let Some(cover_url) = patch.cover_url {
            active.cover_url = Set(Some(cover_url));
        }

        let result = active.update(&self.db).await?;
        tracing::info!("Updated book {}", result.id);
        Ok(Book::from(result))
    }

    async fn delete(&self, id: i32) -> Result<(), DomainError> {
        let result = BookEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(DomainError::NotFound);
        }

        tracing::info!("Deleted book {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db;

    async fn repo() -> SeaOrmBookRepository {
        let db = db::init_db("sqlite::memory:")
            .await
            .expect("Failed to init DB");
        SeaOrmBookRepository::new(db)
    }

    fn fields(title: &str, author: &str) -> BookFields {
        BookFields {
            title: title.to_string(),
            author: author.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_added_at() {
        let repo = repo().await;
        let book = repo
            .create(NewBook {
                fields: fields("Dune", "Herbert"),
                cover_url: None,
            })
            .await
            .unwrap();

        assert!(book.id > 0);
        assert!(book.cover_url.is_none());
        assert!(chrono::DateTime::parse_from_rfc3339(&book.added_at).is_ok());
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let repo = repo().await;
        for title in ["First", "Second", "Third"] {
            repo.create(NewBook {
                fields: fields(title, "Someone"),
                cover_url: None,
            })
            .await
            .unwrap();
        }

        let titles: Vec<String> = repo.list().await.unwrap().into_iter().map(|b| b.title).collect();
        assert_eq!(titles, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_update_without_cover_keeps_existing_cover() {
        let repo = repo().await;
        let created = repo
            .create(NewBook {
                fields: fields("Dune", "Herbert"),
                cover_url: Some("https://covers.example/dune.jpg".to_string()),
            })
            .await
            .unwrap();

        let updated = repo
            .update(
                created.id,
                BookPatch {
                    fields: BookFields {
                        notes: Some("Signed".to_string()),
                        ..fields("Dune", "Frank Herbert")
                    },
                    cover_url: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.author, "Frank Herbert");
        assert_eq!(updated.notes.as_deref(), Some("Signed"));
        assert_eq!(updated.cover_url, created.cover_url);
        assert_eq!(updated.added_at, created.added_at);
    }

    #[tokio::test]
    async fn test_update_and_delete_missing_record() {
        let repo = repo().await;
        let err = repo
            .update(
                999,
                BookPatch {
                    fields: fields("X", "Y"),
                    cover_url: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound));

        let err = repo.delete(999).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound));
    }

    #[tokio::test]
    async fn test_blank_title_is_rejected() {
        let repo = repo().await;
        let err = repo
            .create(NewBook {
                fields: fields("  ", "Herbert"),
                cover_url: None,
            })
            .await
            .unwrap_err();

        match err {
            DomainError::Validation(errors) => {
                assert_eq!(errors.get("title"), Some("Title is required"));
                assert!(errors.get("author").is_none());
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(repo.list().await.unwrap().is_empty());
    }
}
