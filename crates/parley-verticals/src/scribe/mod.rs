//! Medical scribe: doctor/patient transcript to structured EHR entry.
//!
//! A transcript is read as a block (lines up to a blank line), extracted into
//! a `DomainRecord`, stamped and appended to the record store, then echoed
//! back as pretty JSON with a menu to list records, continue or exit.

mod few_shot;

use std::sync::Arc;

use tracing::{info, warn};

use parley_contracts::{
    error::{ExtractionError, HandlerError, StoreError},
    record::{DomainRecord, StoredRecord},
};
use parley_core::{
    conversation::{is_exit_token, FollowUpOutcome, InputMode, TurnReply, Vertical},
    prompt::ExtractionTask,
    traits::RecordStore,
    ExtractionAgent,
};
use parley_store::RecordClock;

pub use few_shot::transcript_examples;

use crate::QUOTA_EXCEEDED;

pub const PARSE_FAILURE: &str = "Failed to parse transcript. Try rephrasing or use a shorter clip.";

pub const ACTIONS_MENU: &str = "Actions: [L]ist records, [C]ontinue, [E]xit";

const INSTRUCTIONS: &str = "You are a concise medical scribe assistant. Given a doctor-patient \
conversation transcript, extract structured EHR information and return ONLY a JSON object \
(no extra text) with the exact fields specified below.

Important:
- Use ISO-like formats where applicable. Use null for missing numeric values.
- Be conservative: if unsure, set fields to null or [] rather than guessing specifics.";

/// The transcript-extraction task, primed with two worked examples.
pub fn transcript_task() -> ExtractionTask {
    ExtractionTask::new(INSTRUCTIONS, DomainRecord::schema(), "Transcript")
        .with_examples(transcript_examples())
}

/// The medical scribe `Vertical`.
pub struct MedicalScribe {
    agent: ExtractionAgent,
    task: ExtractionTask,
    store: Arc<dyn RecordStore>,
    clock: RecordClock,
}

impl MedicalScribe {
    pub fn new(agent: ExtractionAgent, store: Arc<dyn RecordStore>) -> Self {
        Self {
            agent,
            task: transcript_task(),
            store,
            clock: RecordClock::new(),
        }
    }

    /// Stamp `record` and append it to the store.
    pub fn save(&self, record: &DomainRecord) -> Result<StoredRecord, HandlerError> {
        let payload = serde_json::to_value(record).map_err(|e| StoreError::Unavailable {
            reason: format!("cannot encode EHR entry: {e}"),
        })?;
        let stored = self.clock.stamp(payload);
        self.store.append(stored.clone())?;

        info!(record_id = %stored.id, "EHR entry saved");
        Ok(stored)
    }

    fn list_records(&self) -> String {
        match self.store.list_all() {
            Ok(records) => pretty(&records),
            Err(e) => HandlerError::from(e).to_string(),
        }
    }
}

impl Vertical for MedicalScribe {
    type Extraction = Result<DomainRecord, ExtractionError>;

    fn welcome(&self) -> String {
        "Medical Scribe AI (transcript -> structured EHR). Type 'exit' to quit.\n".to_string()
    }

    fn farewell(&self) -> String {
        "Goodbye.".to_string()
    }

    fn input_prompt(&self) -> String {
        "Paste the doctor-patient transcript (single line or multiline). End with an empty line:\n"
            .to_string()
    }

    fn input_mode(&self) -> InputMode {
        InputMode::Block
    }

    fn extract(&self, input: &str) -> Self::Extraction {
        self.agent.extract_as::<DomainRecord>(input, &self.task)
    }

    fn respond(&self, extraction: Self::Extraction) -> TurnReply {
        let record = match extraction {
            Ok(record) => record,
            Err(ExtractionError::RateLimited { .. }) => return TurnReply::text(QUOTA_EXCEEDED),
            Err(e) => {
                warn!(error = %e, "transcript extraction failed");
                return TurnReply::text(PARSE_FAILURE);
            }
        };

        match self.save(&record) {
            Ok(stored) => TurnReply::text(format!(
                "--- EHR entry saved ---\n{}\n------------------------",
                pretty(&stored)
            ))
            .with_follow_up(ACTIONS_MENU),
            Err(e) => TurnReply::text(e.to_string()),
        }
    }

    fn follow_up(&self, choice: &str) -> FollowUpOutcome {
        let choice = choice.trim().to_ascii_lowercase();
        match choice.as_str() {
            "l" => FollowUpOutcome::Reply(self.list_records()),
            "e" => FollowUpOutcome::Close,
            other if is_exit_token(other) => FollowUpOutcome::Close,
            _ => FollowUpOutcome::Continue,
        }
    }
}

fn pretty<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
