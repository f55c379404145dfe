//! Infrastructure layer for external integrations.
//!
//! # Modules
//!
//! - [`persistence`] - Memory, snapshot file and PostgreSQL storage backends

pub mod persistence;
