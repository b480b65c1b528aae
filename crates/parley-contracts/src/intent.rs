//! Intent classification types.
//!
//! `Intent` is the closed set of things a support-desk utterance can ask for.
//! `IntentResult` is the typed view of a completion that conformed to
//! `IntentResult::schema()`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema::{FieldSpec, FieldType, OutputSchema};

/// The closed set of user intents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The user wants to know the warranty/status of a device.
    CheckStatus,
    /// The user has a problem and needs help.
    Troubleshoot,
    /// The user explicitly asks for a support ticket or case.
    CreateCase,
    /// Hello or thank you.
    Greet,
    /// Anything unrelated to the above.
    Unknown,
}

impl Intent {
    /// Every variant, in declaration order.
    pub const ALL: [Intent; 5] = [
        Intent::CheckStatus,
        Intent::Troubleshoot,
        Intent::CreateCase,
        Intent::Greet,
        Intent::Unknown,
    ];

    /// The wire literal used in prompts and completions.
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::CheckStatus => "check_status",
            Intent::Troubleshoot => "troubleshoot",
            Intent::CreateCase => "create_case",
            Intent::Greet => "greet",
            Intent::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified utterance: what the user wants, plus the reference id they
/// mentioned, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    /// Passed through to handlers unvalidated.
    pub reference_id: Option<String>,
}

impl IntentResult {
    /// Schema id of `IntentResult::schema()`.
    pub const SCHEMA_ID: &'static str = "intent-result-v1";

    /// The result used when nothing could be classified.
    pub fn unknown() -> Self {
        Self {
            intent: Intent::Unknown,
            reference_id: None,
        }
    }

    /// The output schema the model must follow.
    ///
    /// `reference_hint` describes the lexical pattern of reference ids
    /// (e.g. `format "GZ5K-XXXXXX"`) and is rendered next to the field.
    pub fn schema(reference_hint: &str) -> OutputSchema {
        OutputSchema::new(
            Self::SCHEMA_ID,
            vec![
                FieldSpec::new(
                    "intent",
                    FieldType::enum_of(Intent::ALL.iter().map(|i| i.as_str())),
                ),
                FieldSpec::new("reference_id", FieldType::nullable(FieldType::String))
                    .with_hint(reference_hint),
            ],
        )
    }
}
