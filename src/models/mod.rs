pub mod book;

pub use book::{Book, BookFormValues, CoverUpload};
