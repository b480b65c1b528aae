//! In-memory implementation of `RecordStore`.
//!
//! Records live in a `Vec` behind `Arc<Mutex<_>>`. Cloning the store shares
//! the same records, so a test can hand one clone to a vertical and inspect
//! the other.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use parley_contracts::{error::StoreError, record::StoredRecord};
use parley_core::traits::RecordStore;

#[derive(Debug, Clone, Default)]
pub struct InMemoryRecordStore {
    records: Arc<Mutex<Vec<StoredRecord>>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Vec<StoredRecord>>, StoreError> {
        self.records.lock().map_err(|e| StoreError::Unavailable {
            reason: format!("record store lock poisoned: {}", e),
        })
    }
}

impl RecordStore for InMemoryRecordStore {
    fn append(&self, record: StoredRecord) -> Result<(), StoreError> {
        let mut records = self.lock()?;
        debug!(record_id = %record.id, total = records.len() + 1, "record appended");
        records.push(record);
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        Ok(self.lock()?.clone())
    }
}
