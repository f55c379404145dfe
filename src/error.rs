//! Error types shared by every storage backend.
//!
//! Expected lookup results (conflict, gone, not found, no content) are not
//! errors; they travel as outcome values defined in
//! [`crate::domain::repositories`]. [`StorageError`] covers the failures a
//! caller cannot act on other than by reporting them.

use thiserror::Error;

/// Failure of a storage operation.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend has no reachable store.
    ///
    /// Memory and file backends always report this from `ping`; the database
    /// backend reports the error recorded when the initial connection failed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("snapshot file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Every positive `i64` short code has been allocated.
    #[error("short code space exhausted")]
    CodesExhausted,

    /// The delete pipeline is no longer accepting requests.
    #[error("delete queue is closed")]
    QueueClosed,
}

impl StorageError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// HTTP status the handler layer answers with when this error escapes.
    pub fn status_code(&self) -> u16 {
        500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_message() {
        let err = StorageError::unavailable("there is no connection to DB");
        assert_eq!(
            err.to_string(),
            "storage unavailable: there is no connection to DB"
        );
        assert_eq!(err.status_code(), 500);
    }

    #[test]
    fn test_from_serde_error() {
        let parse = serde_json::from_str::<Vec<u8>>("not json").unwrap_err();
        let err: StorageError = parse.into();
        assert!(matches!(err, StorageError::Snapshot(_)));
    }
}
