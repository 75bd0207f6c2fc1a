//! Book Service - form submission workflow without HTTP layer
//!
//! Validates form values, resolves the cover, writes through the store
//! adapter and invalidates the book cache after every successful mutation.

use std::sync::Arc;

use crate::domain::{BookFields, BookPatch, BookRepository, DomainError, FieldErrors, NewBook};
use crate::models::{Book, BookFormValues};
use crate::openlibrary::{OpenLibraryClient, clean_isbn};
use crate::services::cache::{BookCache, Snapshot};
use crate::services::cover_service::CoverService;
use crate::views::DeleteConfirmation;

fn is_valid_isbn(isbn: &str) -> bool {
    !isbn.is_empty() && isbn.chars().all(|c| c.is_ascii_digit() || c == '-')
}

/// Per-field validation of form values.
pub fn validate(form: &BookFormValues) -> Result<(), FieldErrors> {
    let mut errors = FieldErrors::new();

    if form.title.trim().is_empty() {
        errors.add("title", "Title is required");
    }
    if form.author.trim().is_empty() {
        errors.add("author", "Author is required");
    }
    if let Some(isbn) = form.isbn.as_deref().map(str::trim).filter(|i| !i.is_empty())
        && !is_valid_isbn(isbn)
    {
        errors.add("isbn", "Invalid ISBN");
    }

    errors.into_result()
}

fn fields_of(form: &BookFormValues) -> BookFields {
    BookFields {
        isbn: form.isbn.clone(),
        title: form.title.clone(),
        author: form.author.clone(),
        edition: form.edition.clone(),
        condition: form.condition.clone(),
        notes: form.notes.clone(),
    }
}

pub struct BookService {
    repo: Arc<dyn BookRepository>,
    cache: Arc<BookCache>,
    covers: Arc<CoverService>,
    lookup: Arc<OpenLibraryClient>,
}

impl BookService {
    pub fn new(
        repo: Arc<dyn BookRepository>,
        cache: Arc<BookCache>,
        covers: Arc<CoverService>,
        lookup: Arc<OpenLibraryClient>,
    ) -> Self {
        Self {
            repo,
            cache,
            covers,
            lookup,
        }
    }

    /// All records, newest first, served from the cache.
    pub async fn list(&self) -> Result<Snapshot, DomainError> {
        self.cache.get().await
    }

    pub async fn get(&self, id: i32) -> Result<Book, DomainError> {
        self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)
    }

    /// Save the form: insert when `id` is unset, otherwise update.
    ///
    /// The cover is resolved (and a local file uploaded) before the store is
    /// touched, so a failed upload never leaves a record behind.
    pub async fn submit(&self, form: BookFormValues) -> Result<Book, DomainError> {
        let form = form.normalized();
        validate(&form)?;

        // An unknown id must fail before any cover is written.
        if let Some(id) = form.id {
            self.repo.find_by_id(id).await?.ok_or(DomainError::NotFound)?;
        }

        let cover_url = self.covers.resolve_cover(&form).await?;
        let fields = fields_of(&form);

        let book = match form.id {
            Some(id) => {
                tracing::info!("Updating book {} (new cover: {})", id, cover_url.is_some());
                self.repo.update(id, BookPatch { fields, cover_url }).await?
            }
            None => {
                tracing::info!("Creating book {:?}", fields.title);
                self.repo.create(NewBook { fields, cover_url }).await?
            }
        };

        self.refresh_cache().await;
        Ok(book)
    }

    /// Delete a record once the user confirmed. Returns whether anything was
    /// deleted; a declined confirmation never reaches the store.
    pub async fn delete(
        &self,
        id: i32,
        confirmation: DeleteConfirmation,
    ) -> Result<bool, DomainError> {
        if !confirmation.is_confirmed() {
            tracing::debug!("Delete of book {} declined", id);
            return Ok(false);
        }

        self.repo.delete(id).await?;
        self.refresh_cache().await;
        Ok(true)
    }

    /// Fill title and author from an ISBN lookup. Values are returned
    /// unchanged when Open Library has no record for the ISBN.
    pub async fn prefill_from_isbn(
        &self,
        mut form: BookFormValues,
    ) -> Result<BookFormValues, DomainError> {
        let Some(isbn) = form.isbn.as_deref().map(clean_isbn).filter(|i| !i.is_empty()) else {
            return Ok(form);
        };

        if let Some(candidate) = self.lookup.lookup_isbn(&isbn).await? {
            form.title = candidate.title.clone();
            form.author = candidate.author_line();
        }
        Ok(form)
    }

    pub fn covers(&self) -> &CoverService {
        &self.covers
    }

    async fn refresh_cache(&self) {
        // The write already succeeded; a failed refetch only leaves the
        // previous snapshot in place.
        if let Err(e) = self.cache.invalidate().await {
            tracing::warn!("Book cache refresh after mutation failed: {}", e);
        }
    }
}
