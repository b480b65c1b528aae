//! JSON-file implementation of `RecordStore`.
//!
//! The file holds a single pretty-printed JSON array of `StoredRecord`s in
//! append order. A missing file is an empty store. Each append rewrites the
//! whole array through a sibling temp file and a rename, so a crash mid-write
//! leaves the previous contents intact.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing::{debug, info, warn};

use parley_contracts::{error::StoreError, record::StoredRecord};
use parley_core::traits::RecordStore;

#[derive(Debug)]
pub struct JsonFileRecordStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl JsonFileRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<StoredRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "record file absent; store is empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(unavailable(&self.path, "read", e)),
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&text).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "record file is corrupt");
            unavailable(&self.path, "decode", e)
        })
    }

    fn save(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| unavailable(parent, "create directory", e))?;
        }

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| unavailable(&self.path, "encode", e))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, json).map_err(|e| unavailable(&tmp, "write", e))?;
        fs::rename(&tmp, &self.path).map_err(|e| unavailable(&self.path, "replace", e))
    }
}

impl RecordStore for JsonFileRecordStore {
    fn append(&self, record: StoredRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().map_err(|e| StoreError::Unavailable {
            reason: format!("record file lock poisoned: {}", e),
        })?;

        let mut records = self.load()?;
        let record_id = record.id;
        records.push(record);
        self.save(&records)?;

        info!(
            path = %self.path.display(),
            record_id = %record_id,
            total = records.len(),
            "record saved"
        );
        Ok(())
    }

    fn list_all(&self) -> Result<Vec<StoredRecord>, StoreError> {
        self.load()
    }
}

fn unavailable(path: &Path, op: &str, err: impl std::fmt::Display) -> StoreError {
    StoreError::Unavailable {
        reason: format!("cannot {op} {}: {err}", path.display()),
    }
}
