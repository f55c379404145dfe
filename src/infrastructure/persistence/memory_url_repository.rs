//! In-memory implementation of the URL repository.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use super::url_index::{Inserted, UrlIndex};
use crate::domain::delete_request::DeleteRequest;
use crate::domain::entities::UserUrl;
use crate::domain::repositories::{AddOutcome, ListOutcome, SearchOutcome, UrlRepository};
use crate::error::StorageError;
use crate::utils::short_url::format_short_url;

/// Repository that keeps every record in process memory.
///
/// One mutex guards the arena and both indexes; readers and writers are not
/// distinguished. Contents are lost when the process exits.
pub struct MemoryUrlRepository {
    base_url: String,
    index: Mutex<UrlIndex>,
}

impl MemoryUrlRepository {
    /// Creates an empty repository. `base_url` must end with `/`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            index: Mutex::new(UrlIndex::new()),
        }
    }

    fn index(&self) -> MutexGuard<'_, UrlIndex> {
        self.index.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl UrlRepository for MemoryUrlRepository {
    async fn add_url(&self, url: &str, user_id: &str) -> Result<AddOutcome, StorageError> {
        let inserted = self.index().insert(url, user_id)?;

        Ok(match inserted {
            Inserted::Created(code) => {
                let reference = format_short_url(&self.base_url, code);
                debug!(url, %reference, "URL stored in memory");
                AddOutcome::Created(reference)
            }
            Inserted::Existing(code) => {
                AddOutcome::Conflict(format_short_url(&self.base_url, code))
            }
        })
    }

    async fn search_url(&self, code: i64) -> Result<SearchOutcome, StorageError> {
        let index = self.index();

        Ok(match index.get(code) {
            None => SearchOutcome::NotFound,
            Some(record) if record.tombstoned => SearchOutcome::Gone(record.original_url.clone()),
            Some(record) => SearchOutcome::Found(record.original_url.clone()),
        })
    }

    async fn get_all_urls_for_user(&self, user_id: &str) -> Result<ListOutcome, StorageError> {
        let urls = self
            .index()
            .live_for_user(user_id)
            .map(|record| {
                UserUrl::new(
                    format_short_url(&self.base_url, record.code),
                    record.original_url.clone(),
                )
            })
            .collect();

        Ok(ListOutcome::from_urls(urls))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        Err(StorageError::unavailable("there is no connection to DB"))
    }

    async fn delete_batch(&self, batch: Vec<DeleteRequest>) -> Result<u64, StorageError> {
        let mut index = self.index();

        Ok(batch
            .iter()
            .map(|request| index.tombstone(&request.user_id, &request.codes))
            .sum())
    }
}
