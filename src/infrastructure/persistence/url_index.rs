//! In-process record arena shared by the memory and file backends.

use std::collections::{BTreeSet, HashMap};

use tracing::warn;

use crate::domain::entities::UrlRecord;
use crate::error::StorageError;

/// Result of [`UrlIndex::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    Created(i64),
    Existing(i64),
}

/// Records keyed by short code, plus the two lookup indexes.
///
/// Not synchronised; owners wrap it in a single mutex so every mutation of
/// the arena and both indexes happens in one critical section.
///
/// - `by_url` holds live records only, so a tombstoned URL can be stored again
/// - `by_user` keeps every code a user created, in creation order
#[derive(Debug, Default)]
pub struct UrlIndex {
    records: HashMap<i64, UrlRecord>,
    by_url: HashMap<String, i64>,
    by_user: HashMap<String, Vec<i64>>,
    last_code: i64,
}

impl UrlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the indexes from stored records.
    ///
    /// The code allocator resumes after the largest code seen.
    pub fn from_records(records: impl IntoIterator<Item = UrlRecord>) -> Self {
        let mut index = Self::new();

        for record in records {
            if index.records.contains_key(&record.code) {
                warn!(code = record.code, "Duplicate short code in stored records, keeping the first");
                continue;
            }
            index.restore(record);
        }

        index
    }

    /// Adds `record` to the arena and indexes as-is.
    ///
    /// The allocator moves past `record.code` if needed.
    pub fn restore(&mut self, record: UrlRecord) {
        self.last_code = self.last_code.max(record.code);

        if record.is_live() {
            self.by_url.insert(record.original_url.clone(), record.code);
        }
        self.by_user
            .entry(record.owner.clone())
            .or_default()
            .push(record.code);
        self.records.insert(record.code, record);
    }

    /// Code of the live record holding `url`.
    pub fn find_live(&self, url: &str) -> Option<i64> {
        self.by_url.get(url).copied()
    }

    /// The code the next insert will receive. Does not reserve it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CodesExhausted`] once `i64::MAX` is taken.
    pub fn next_code(&self) -> Result<i64, StorageError> {
        self.last_code
            .checked_add(1)
            .ok_or(StorageError::CodesExhausted)
    }

    /// Stores `url` for `owner` unless a live record already holds it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::CodesExhausted`] if no code is left.
    pub fn insert(&mut self, url: &str, owner: &str) -> Result<Inserted, StorageError> {
        if let Some(code) = self.find_live(url) {
            return Ok(Inserted::Existing(code));
        }

        let code = self.next_code()?;
        self.restore(UrlRecord::new(code, url, owner));

        Ok(Inserted::Created(code))
    }

    pub fn get(&self, code: i64) -> Option<&UrlRecord> {
        self.records.get(&code)
    }

    /// Live records owned by `owner`, oldest first.
    pub fn live_for_user<'a>(&'a self, owner: &str) -> impl Iterator<Item = &'a UrlRecord> + use<'a> {
        self.by_user
            .get(owner)
            .into_iter()
            .flatten()
            .filter_map(|code| self.records.get(code))
            .filter(|record| record.is_live())
    }

    /// Codes in `codes` that are live and belong to `owner`. Nothing changes.
    pub fn tombstone_candidates(&self, owner: &str, codes: &[i64]) -> BTreeSet<i64> {
        codes
            .iter()
            .copied()
            .filter(|code| {
                self.records
                    .get(code)
                    .is_some_and(|record| record.owner == owner && record.is_live())
            })
            .collect()
    }

    /// Tombstones every live record in `codes`, ignoring ownership.
    ///
    /// Returns how many records changed state.
    pub fn tombstone_codes(&mut self, codes: &BTreeSet<i64>) -> u64 {
        let mut flipped = 0;

        for code in codes {
            let Some(record) = self.records.get_mut(code) else {
                continue;
            };
            if record.tombstoned {
                continue;
            }

            record.tombstoned = true;
            self.by_url.remove(&record.original_url);
            flipped += 1;
        }

        flipped
    }

    /// Tombstones the live records in `codes` that belong to `owner`.
    ///
    /// Returns how many records changed state.
    pub fn tombstone(&mut self, owner: &str, codes: &[i64]) -> u64 {
        let candidates = self.tombstone_candidates(owner, codes);
        self.tombstone_codes(&candidates)
    }

    /// All records ordered by short code.
    pub fn records(&self) -> Vec<&UrlRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by_key(|record| record.code);
        records
    }

    pub fn last_code(&self) -> i64 {
        self.last_code
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
