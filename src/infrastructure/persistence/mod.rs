//! Storage backends.
//!
//! Concrete implementations of [`crate::domain::repositories::UrlRepository`].
//!
//! # Repositories
//!
//! - [`MemoryUrlRepository`] - Process memory, nothing persisted
//! - [`FileUrlRepository`] - Process memory mirrored to a JSON snapshot
//! - [`PgUrlRepository`] - PostgreSQL `storage` table
//!
//! The first two share the [`UrlIndex`] arena.

pub mod file_url_repository;
pub mod memory_url_repository;
pub mod pg_url_repository;
pub mod url_index;

pub use file_url_repository::FileUrlRepository;
pub use memory_url_repository::MemoryUrlRepository;
pub use pg_url_repository::PgUrlRepository;
pub use url_index::UrlIndex;
