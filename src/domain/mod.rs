//! Domain layer containing business entities and logic.
//!
//! # Architecture
//!
//! - [`entities`] - URL records and listing items
//! - [`repositories`] - The storage contract implemented by every backend
//! - [`delete_request`] - Soft-delete request model
//! - [`delete_worker`] - Bounded queue and batching worker for soft deletes
//!
//! # Soft Delete Flow
//!
//! 1. The caller parses the codes and builds a [`delete_request::DeleteRequest`]
//! 2. The request is pushed to [`delete_worker::DeleteQueue`] and acknowledged
//! 3. The worker groups requests and calls
//!    [`repositories::UrlRepository::delete_batch`]
//! 4. Failed batches are logged and dropped

pub mod delete_request;
pub mod delete_worker;
pub mod entities;
pub mod repositories;
