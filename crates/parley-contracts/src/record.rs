//! Stored records and the EHR domain record.
//!
//! `StoredRecord` is what a record store appends: a time-ordered id, a
//! creation timestamp and an arbitrary JSON payload. Records are written once
//! and never modified or deleted.
//!
//! `DomainRecord` is the typed view of a medical-scribe extraction. Every
//! leaf is independently nullable and lists default to empty, matching the
//! "null or [] when unknown" rule of its schema.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::schema::{FieldSpec, FieldType, OutputSchema};

/// Time-ordered record identifier: milliseconds since the Unix epoch.
///
/// Ids handed out by one clock within one process never decrease.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry in a record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    /// A `DomainRecord`, a support ticket, or any other domain payload.
    pub payload: serde_json::Value,
}

// ── EHR domain record ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub gender: Option<Gender>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub temperature_c: Option<f64>,
    pub heart_rate_bpm: Option<i64>,
    pub respiratory_rate_bpm: Option<i64>,
    /// Free text, e.g. "120/80 mmHg".
    pub blood_pressure: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub name: String,
    pub dose: Option<String>,
    pub frequency: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Findings {
    pub symptoms: Vec<String>,
    pub medications: Vec<Medication>,
    pub allergies: Vec<String>,
    pub assessment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CarePlan {
    pub treatment: Option<String>,
    pub follow_up: Option<String>,
}

/// Structured EHR entry extracted from a doctor/patient transcript.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub patient: Patient,
    pub vitals: Vitals,
    pub findings: Findings,
    pub plan: CarePlan,
}

impl DomainRecord {
    pub const SCHEMA_ID: &'static str = "ehr-record-v1";

    /// The output schema the scribe model must follow.
    pub fn schema() -> OutputSchema {
        let nullable_string = || FieldType::nullable(FieldType::String);
        let nullable_integer = || FieldType::nullable(FieldType::Integer);

        OutputSchema::new(
            Self::SCHEMA_ID,
            vec![
                FieldSpec::new(
                    "patient",
                    FieldType::object(vec![
                        FieldSpec::new("name", nullable_string()),
                        FieldSpec::new("age", nullable_integer()),
                        FieldSpec::new(
                            "gender",
                            FieldType::nullable(FieldType::enum_of(["male", "female"])),
                        ),
                    ]),
                ),
                FieldSpec::new(
                    "vitals",
                    FieldType::object(vec![
                        FieldSpec::new("temperature_c", FieldType::nullable(FieldType::Number)),
                        FieldSpec::new("heart_rate_bpm", nullable_integer()),
                        FieldSpec::new("respiratory_rate_bpm", nullable_integer()),
                        FieldSpec::new("blood_pressure", nullable_string())
                            .with_hint("e.g. \"120/80 mmHg\""),
                    ]),
                ),
                FieldSpec::new(
                    "findings",
                    FieldType::object(vec![
                        FieldSpec::new("symptoms", FieldType::array_of(FieldType::String)),
                        FieldSpec::new(
                            "medications",
                            FieldType::array_of(FieldType::object(vec![
                                FieldSpec::new("name", FieldType::String),
                                FieldSpec::new("dose", nullable_string()),
                                FieldSpec::new("frequency", nullable_string()),
                            ])),
                        ),
                        FieldSpec::new("allergies", FieldType::array_of(FieldType::String)),
                        FieldSpec::new("assessment", nullable_string()),
                    ]),
                ),
                FieldSpec::new(
                    "plan",
                    FieldType::object(vec![
                        FieldSpec::new("treatment", nullable_string()),
                        FieldSpec::new("follow_up", nullable_string()),
                    ]),
                ),
            ],
        )
    }
}
