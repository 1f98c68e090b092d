pub mod course;
pub mod database;
