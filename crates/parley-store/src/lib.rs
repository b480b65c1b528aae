//! # parley-store
//!
//! Append-only record stores for Parley.
//!
//! Records are appended once and never modified or deleted; `list_all`
//! returns them in append order.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use parley_store::{JsonFileRecordStore, RecordClock};
//! use parley_core::traits::RecordStore;
//!
//! let store = JsonFileRecordStore::new("ehr_records.json");
//! let clock = RecordClock::new();
//! store.append(clock.stamp(payload))?;
//! let all = store.list_all()?;
//! ```

pub mod clock;
pub mod file;
pub mod memory;

pub use clock::RecordClock;
pub use file::JsonFileRecordStore;
pub use memory::InMemoryRecordStore;

// ── Tests ─────────────────────────────────────────────────────────────────────
