//! Core domain entities.
//!
//! - [`UrlRecord`] - A short code bound to an original URL and its owner
//! - [`UserUrl`] - A row of a user's listing, as returned to callers

pub mod url_record;

pub use url_record::{UrlRecord, UserUrl};
