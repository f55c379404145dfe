//! Helper functions shared by the storage backends.
//!
//! - [`short_url`] - Short reference formatting and parsing
//! - [`db_error`] - PostgreSQL error classification

pub mod db_error;
pub mod short_url;
