//! Application state containing repositories and shared resources

use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::domain::BookRepository;
use crate::infrastructure::SeaOrmBookRepository;
use crate::infrastructure::assets::{AssetStore, LocalAssetStore};
use crate::infrastructure::config::Config;
use crate::openlibrary::OpenLibraryClient;
use crate::services::{BookCache, BookService, CoverConverter, CoverService, default_converter};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    /// Book repository
    pub book_repo: Arc<dyn BookRepository>,
    /// Cached book list shared by every view
    pub cache: Arc<BookCache>,
    /// Open Library client
    pub lookup: Arc<OpenLibraryClient>,
    pub covers: Arc<CoverService>,
    pub books: Arc<BookService>,
}

impl AppState {
    /// Create a new AppState with all repositories initialized
    pub fn new(db: DatabaseConnection, config: &Config) -> Self {
        Self::with_converter(db, config, default_converter())
    }

    /// Same as [`AppState::new`] with a specific cover converter.
    pub fn with_converter(
        db: DatabaseConnection,
        config: &Config,
        converter: Arc<dyn CoverConverter>,
    ) -> Self {
        let assets: Arc<dyn AssetStore> = Arc::new(LocalAssetStore::new(
            config.assets_dir.clone(),
            config.public_base_url.clone(),
        ));
        Self::with_parts(db, config, assets, converter)
    }

    pub fn with_parts(
        db: DatabaseConnection,
        config: &Config,
        assets: Arc<dyn AssetStore>,
        converter: Arc<dyn CoverConverter>,
    ) -> Self {
        let book_repo: Arc<dyn BookRepository> = Arc::new(SeaOrmBookRepository::new(db.clone()));
        let cache = Arc::new(BookCache::new(book_repo.clone()));
        let lookup = Arc::new(OpenLibraryClient::from_config(config));
        let covers = Arc::new(CoverService::new(lookup.clone(), assets, converter));
        let books = Arc::new(BookService::new(
            book_repo.clone(),
            cache.clone(),
            covers.clone(),
            lookup.clone(),
        ));

        Self {
            db,
            book_repo,
            cache,
            lookup,
            covers,
            books,
        }
    }

    /// Get the database connection
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

// Implement FromRef to allow extracting DatabaseConnection from AppState
impl axum::extract::FromRef<AppState> for DatabaseConnection {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
