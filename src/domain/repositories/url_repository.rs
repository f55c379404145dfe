//! Storage contract shared by the memory, file and PostgreSQL backends.

use crate::domain::delete_request::DeleteRequest;
use crate::domain::delete_worker;
use crate::domain::entities::UserUrl;
use crate::error::StorageError;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Result of [`UrlRepository::add_url`].
///
/// Both variants carry a usable short reference: a conflict is a signal for
/// the caller, not a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new short code was allocated.
    Created(String),
    /// The URL is already stored as a live record; this is its reference.
    Conflict(String),
}

impl AddOutcome {
    pub fn reference(&self) -> &str {
        match self {
            Self::Created(reference) | Self::Conflict(reference) => reference,
        }
    }

    pub fn into_reference(self) -> String {
        match self {
            Self::Created(reference) | Self::Conflict(reference) => reference,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Created(_) => 201,
            Self::Conflict(_) => 409,
        }
    }
}

/// Result of [`UrlRepository::search_url`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(String),
    /// The record exists but has been tombstoned.
    Gone(String),
    NotFound,
}

impl SearchOutcome {
    /// The original URL, for live and tombstoned records alike.
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Found(url) | Self::Gone(url) => Some(url),
            Self::NotFound => None,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Found(_) => 307,
            Self::Gone(_) => 410,
            Self::NotFound => 404,
        }
    }
}

/// Result of [`UrlRepository::get_all_urls_for_user`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListOutcome {
    /// Live records in the order the user created them.
    Found(Vec<UserUrl>),
    NoContent,
}

impl ListOutcome {
    /// Wraps a listing, turning an empty one into [`ListOutcome::NoContent`].
    pub fn from_urls(urls: Vec<UserUrl>) -> Self {
        if urls.is_empty() {
            Self::NoContent
        } else {
            Self::Found(urls)
        }
    }

    pub fn into_urls(self) -> Vec<UserUrl> {
        match self {
            Self::Found(urls) => urls,
            Self::NoContent => Vec::new(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Found(_) => 200,
            Self::NoContent => 204,
        }
    }
}

/// Storage engine for shortened URLs.
///
/// Every backend honours the same contract:
///
/// - a record is visible to [`search_url`](Self::search_url) and
///   [`get_all_urls_for_user`](Self::get_all_urls_for_user) as soon as
///   [`add_url`](Self::add_url) returns
/// - a live URL maps to exactly one short code
/// - listings exclude tombstoned records and keep creation order
/// - tombstones are applied only through the batched delete path
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryUrlRepository`] - Process memory
/// - [`crate::infrastructure::persistence::FileUrlRepository`] - Memory plus JSON snapshot
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Stores `url` for `user_id`, or returns the reference of the live record
    /// that already holds it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read or written.
    async fn add_url(&self, url: &str, user_id: &str) -> Result<AddOutcome, StorageError>;

    /// Resolves a short code to its original URL.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read.
    async fn search_url(&self, code: i64) -> Result<SearchOutcome, StorageError>;

    /// Lists the live URLs created by `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the backend cannot be read.
    async fn get_all_urls_for_user(&self, user_id: &str) -> Result<ListOutcome, StorageError>;

    /// Reports whether the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Unavailable`] for backends without a connection,
    /// and the connection or query error for the database backend.
    async fn ping(&self) -> Result<(), StorageError>;

    /// Tombstones every code in `batch` that belongs to the requesting user.
    ///
    /// Returns the number of records flipped by this call.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the mutation could not be applied. Nothing
    /// is retried.
    async fn delete_batch(&self, batch: Vec<DeleteRequest>) -> Result<u64, StorageError>;

    /// Drains delete requests from `rx` until every sender is dropped,
    /// applying them through [`delete_batch`](Self::delete_batch) in groups of
    /// at most `batch_size`.
    async fn delete_for_user(&self, rx: mpsc::Receiver<DeleteRequest>, batch_size: usize) {
        delete_worker::drain(self, rx, batch_size).await;
    }
}
