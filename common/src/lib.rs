mod domain;
mod infrastructure;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Persisted document table and column names

pub const DOCUMENTS_TABLE_NAME: &'static str = "coursegate_documents";
pub const KEY_FIELD_NAME: &'static str = "key";
pub const BODY_FIELD_NAME: &'static str = "body";
pub const UPDATED_FIELD_NAME: &'static str = "updated_at";

// expose domain module

pub use domain::*;
pub use infrastructure::course::load as load_course;

// expose database module

pub use infrastructure::database;
