//! Repository trait definitions for the domain layer.
//!
//! The storage contract is defined here as a trait and implemented by the
//! backends in `crate::infrastructure::persistence`. Which backend serves a
//! process is decided from configuration (see [`crate::runtime`]).
//!
//! # Available Repositories
//!
//! - [`UrlRepository`] - Short URL storage, lookup, listing and soft deletion
//!
//! # Testing
//!
//! Backend behaviour is covered by `tests/repository_*.rs`; a `mockall` mock
//! is generated for unit tests.

pub mod url_repository;

pub use url_repository::{AddOutcome, ListOutcome, SearchOutcome, UrlRepository};

#[cfg(test)]
pub use url_repository::MockUrlRepository;
