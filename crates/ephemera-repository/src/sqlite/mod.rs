//! SQLite repository implementations.

mod image_repository;

pub use image_repository::SqliteImageRepository;
