//! External integrations

pub mod openlibrary;
