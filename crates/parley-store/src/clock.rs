//! Time-ordered record ids.

use std::sync::Mutex;

use chrono::{DateTime, TimeZone, Utc};

use parley_contracts::record::{RecordId, StoredRecord};

/// Hands out `RecordId`s from the wall clock, in milliseconds.
///
/// Two records stamped in the same millisecond (or after the wall clock steps
/// backwards) get `last + 1`, so ids from one clock strictly increase.
#[derive(Debug, Default)]
pub struct RecordClock {
    last: Mutex<u64>,
}

impl RecordClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next id, never lower than or equal to one already handed out.
    pub fn next_id(&self) -> RecordId {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        // A poisoned lock still holds a valid counter.
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let id = now.max(*last + 1);
        *last = id;
        RecordId(id)
    }

    /// Wrap `payload` in a `StoredRecord` with a fresh id.
    ///
    /// `created_at` is derived from the id so the two always agree.
    pub fn stamp(&self, payload: serde_json::Value) -> StoredRecord {
        let id = self.next_id();
        let created_at: DateTime<Utc> = Utc
            .timestamp_millis_opt(id.0 as i64)
            .single()
            .unwrap_or_else(Utc::now);
        StoredRecord {
            id,
            created_at,
            payload,
        }
    }
}
