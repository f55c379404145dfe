//! JSON snapshot file implementation of the URL repository.

use std::collections::BTreeSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::url_index::UrlIndex;
use crate::domain::delete_request::DeleteRequest;
use crate::domain::entities::{UrlRecord, UserUrl};
use crate::domain::repositories::{AddOutcome, ListOutcome, SearchOutcome, UrlRepository};
use crate::error::StorageError;
use crate::utils::short_url::format_short_url;

/// One element of the snapshot array.
///
/// Field names match snapshots written by earlier deployments. `deleted` is
/// omitted for live records so those files load unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct SnapshotRecord {
    #[serde(rename = "fullURL")]
    full_url: String,
    #[serde(rename = "shortenURL")]
    shorten_url: i64,
    #[serde(default)]
    user: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    deleted: bool,
}

impl From<SnapshotRecord> for UrlRecord {
    fn from(r: SnapshotRecord) -> Self {
        UrlRecord {
            code: r.shorten_url,
            original_url: r.full_url,
            owner: r.user,
            tombstoned: r.deleted,
        }
    }
}

impl From<&UrlRecord> for SnapshotRecord {
    fn from(r: &UrlRecord) -> Self {
        SnapshotRecord {
            full_url: r.original_url.clone(),
            shorten_url: r.code,
            user: r.owner.clone(),
            deleted: r.tombstoned,
        }
    }
}

/// Repository that keeps records in memory and mirrors them to a JSON file.
///
/// The whole record list is re-encoded and the file overwritten on every
/// mutation. The new snapshot is written first, under the index lock, and the
/// in-memory index only changes after the write succeeded. A crash in the
/// middle of a write can still leave a truncated file.
pub struct FileUrlRepository {
    base_url: String,
    path: PathBuf,
    index: Mutex<UrlIndex>,
}

impl FileUrlRepository {
    /// Loads the snapshot at `path`, creating an empty one if it is missing.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Io`] if the file cannot be read or created and
    /// [`StorageError::Snapshot`] if its content is not a valid snapshot.
    pub async fn open(
        base_url: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Result<Self, StorageError> {
        let path = path.into();
        let records = load_snapshot(&path).await?;
        let index = UrlIndex::from_records(records.into_iter().map(UrlRecord::from));

        info!(
            path = %path.display(),
            records = index.len(),
            last_code = index.last_code(),
            "Loaded URL snapshot"
        );

        Ok(Self {
            base_url: base_url.into(),
            path,
            index: Mutex::new(index),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes the snapshot `index` would have after adding `added` and
    /// tombstoning `flipped`.
    ///
    /// The index itself is not touched; callers commit the change only once
    /// this returns `Ok`, so a failed or cancelled write leaves memory and
    /// disk on the previous state.
    async fn persist_staged(
        &self,
        index: &UrlIndex,
        added: Option<&UrlRecord>,
        flipped: &BTreeSet<i64>,
    ) -> Result<(), StorageError> {
        let snapshot: Vec<SnapshotRecord> = index
            .records()
            .into_iter()
            .map(|record| {
                let mut entry = SnapshotRecord::from(record);
                entry.deleted |= flipped.contains(&record.code);
                entry
            })
            .chain(added.map(SnapshotRecord::from))
            .collect();
        let json = serde_json::to_vec(&snapshot)?;

        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), records = snapshot.len(), "Snapshot written");
        Ok(())
    }
}

async fn load_snapshot(path: &Path) -> Result<Vec<SnapshotRecord>, StorageError> {
    match tokio::fs::read(path).await {
        Ok(content) if content.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
        Ok(content) => Ok(serde_json::from_slice(&content)?),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tokio::fs::write(path, b"[]").await?;
            info!(path = %path.display(), "Created empty URL snapshot");
            Ok(Vec::new())
        }
        Err(e) => Err(e.into()),
    }
}

#[async_trait]
impl UrlRepository for FileUrlRepository {
    async fn add_url(&self, url: &str, user_id: &str) -> Result<AddOutcome, StorageError> {
        let mut index = self.index.lock().await;

        if let Some(code) = index.find_live(url) {
            return Ok(AddOutcome::Conflict(format_short_url(&self.base_url, code)));
        }

        let record = UrlRecord::new(index.next_code()?, url, user_id);
        self.persist_staged(&index, Some(&record), &BTreeSet::new()).await?;

        let reference = format_short_url(&self.base_url, record.code);
        index.restore(record);
        debug!(url, %reference, "URL stored in snapshot");

        Ok(AddOutcome::Created(reference))
    }

    async fn search_url(&self, code: i64) -> Result<SearchOutcome, StorageError> {
        let index = self.index.lock().await;

        Ok(match index.get(code) {
            None => SearchOutcome::NotFound,
            Some(record) if record.tombstoned => SearchOutcome::Gone(record.original_url.clone()),
            Some(record) => SearchOutcome::Found(record.original_url.clone()),
        })
    }

    async fn get_all_urls_for_user(&self, user_id: &str) -> Result<ListOutcome, StorageError> {
        let index = self.index.lock().await;

        let urls = index
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
        let mut index = self.index.lock().await;

        let flipped: BTreeSet<i64> = batch
            .iter()
            .flat_map(|request| index.tombstone_candidates(&request.user_id, &request.codes))
            .collect();

        if flipped.is_empty() {
            return Ok(0);
        }

        self.persist_staged(&index, None, &flipped).await?;
        Ok(index.tombstone_codes(&flipped))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_record_reads_legacy_shape() {
        let json = r#"[{"fullURL":"https://a/","shortenURL":4,"user":"u1"}]"#;
        let records: Vec<SnapshotRecord> = serde_json::from_str(json).unwrap();

        let record = UrlRecord::from(records[0].clone());
        assert_eq!(record, UrlRecord::new(4, "https://a/", "u1"));
    }

    #[test]
    fn test_live_record_omits_deleted_flag() {
        let live = SnapshotRecord::from(&UrlRecord::new(1, "https://a/", "u1"));
        let json = serde_json::to_string(&live).unwrap();

        assert_eq!(json, r#"{"fullURL":"https://a/","shortenURL":1,"user":"u1"}"#);
    }

    #[test]
    fn test_tombstoned_record_keeps_deleted_flag() {
        let mut record = UrlRecord::new(2, "https://b/", "u1");
        record.tombstoned = true;

        let json = serde_json::to_value(SnapshotRecord::from(&record)).unwrap();
        assert_eq!(json["deleted"], true);

        let back: SnapshotRecord = serde_json::from_value(json).unwrap();
        assert!(UrlRecord::from(back).tombstoned);
    }
}
