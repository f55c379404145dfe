//! Application layer services.
//!
//! # Available Services
//!
//! - [`services::identity_service::IdentityService`] - Anonymous user identity
//!   issued and verified through a signed cookie pair

pub mod services;
