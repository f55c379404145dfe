//! Business logic services for the application layer.

pub mod identity_service;

pub use identity_service::{Identity, IdentityService, SecretKey};
