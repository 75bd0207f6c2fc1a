//! Edit-form lifecycle and delete confirmation.

use serde::{Deserialize, Serialize};

use crate::models::{Book, BookFormValues};

/// An open edit form for one record. Edits live only in the session;
/// closing it drops them.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    original: Book,
    values: BookFormValues,
}

impl EditSession {
    /// Open the form pre-populated with the record's current fields.
    pub fn open(book: &Book) -> Self {
        Self {
            original: book.clone(),
            values: BookFormValues::from(book),
        }
    }

    pub fn original(&self) -> &Book {
        &self.original
    }

    pub fn values(&self) -> &BookFormValues {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut BookFormValues {
        &mut self.values
    }

    pub fn is_dirty(&self) -> bool {
        self.values != BookFormValues::from(&self.original)
    }

    /// Close without saving.
    pub fn close(self) {
        if self.is_dirty() {
            tracing::debug!("Discarding unsaved edits to book {}", self.original.id);
        }
    }

    /// Hand the edited values over for submission.
    pub fn into_submission(self) -> BookFormValues {
        self.values
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeleteConfirmation {
    Confirmed,
    Declined,
}

impl DeleteConfirmation {
    pub fn from_flag(confirmed: bool) -> Self {
        if confirmed {
            DeleteConfirmation::Confirmed
        } else {
            DeleteConfirmation::Declined
        }
    }

    pub fn is_confirmed(self) -> bool {
        self == DeleteConfirmation::Confirmed
    }
}

/// Prompt shown before a record is deleted.
pub fn delete_prompt(title: &str) -> String {
    format!(
        "Are you sure you want to delete “{}”? This cannot be undone.",
        title
    )
}
