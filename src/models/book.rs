use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Condition grades offered by the book form.
pub const CONDITIONS: [&str; 4] = ["Like New", "Very Good", "Good", "Acceptable"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "books")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub edition: Option<String>,
    pub condition: Option<String>,
    pub notes: Option<String>,
    pub cover_url: Option<String>,
    pub added_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// DTO for API responses and views
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Book {
    pub id: i32,
    pub isbn: Option<String>,
    pub title: String,
    pub author: String,
    pub edition: Option<String>,
    pub condition: Option<String>,
    pub notes: Option<String>,
    pub cover_url: Option<String>,
    /// RFC 3339 timestamp set by the store on insert
    pub added_at: String,
}

impl From<Model> for Book {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            isbn: model.isbn,
            title: model.title,
            author: model.author,
            edition: model.edition,
            condition: model.condition,
            notes: model.notes,
            cover_url: model.cover_url,
            added_at: model.added_at,
        }
    }
}

/// A cover file picked by the user, before conversion and upload.
#[derive(Clone, PartialEq)]
pub struct CoverUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for CoverUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoverUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Values held by the add/edit form.
///
/// `id` set means the submission updates that record, otherwise a new record
/// is inserted. `cover_url` is the record's current cover and is only shown;
/// a new cover comes from `selected_cover_url` or from `cover`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookFormValues {
    #[serde(default)]
    pub id: Option<i32>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub edition: Option<String>,
    #[serde(default)]
    pub condition: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub selected_cover_url: Option<String>,
    #[serde(skip)]
    pub cover: Option<CoverUpload>,
}

impl BookFormValues {
    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// Trim text inputs and turn blank optional fields into `None`.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.author = self.author.trim().to_string();
        self.isbn = blank_to_none(self.isbn);
        self.edition = blank_to_none(self.edition);
        self.condition = blank_to_none(self.condition);
        self.notes = blank_to_none(self.notes);
        self.cover_url = blank_to_none(self.cover_url);
        self.selected_cover_url = blank_to_none(self.selected_cover_url);
        if self.cover.as_ref().is_some_and(|c| c.bytes.is_empty()) {
            self.cover = None;
        }
        self
    }
}

impl From<&Book> for BookFormValues {
    fn from(book: &Book) -> Self {
        Self {
            id: Some(book.id),
            isbn: book.isbn.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            edition: book.edition.clone(),
            condition: book.condition.clone(),
            notes: book.notes.clone(),
            cover_url: book.cover_url.clone(),
            selected_cover_url: None,
            cover: None,
        }
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
