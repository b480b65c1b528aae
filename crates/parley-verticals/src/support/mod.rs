//! GizmoTron 5000 support desk.
//!
//! Each line the user types is classified into an `IntentResult` by the
//! extraction agent, routed by the `IntentRouter`, and answered by
//! `SupportActions`. Extraction failures fall through to the clarification
//! reply, except quota rejections which get their own message.

pub mod actions;
pub mod catalog;

use std::sync::Arc;

use serde_json::json;
use tracing::debug;

use parley_contracts::{error::ExtractionError, intent::IntentResult};
use parley_core::{
    conversation::{InputMode, TurnReply, Vertical},
    prompt::{ExtractionTask, FewShotExample},
    traits::RecordStore,
    ExtractionAgent, IntentRouter,
};

pub use actions::SupportActions;

use crate::QUOTA_EXCEEDED;
use catalog::SERIAL_FORMAT;

const INSTRUCTIONS: &str = r#"You are a helpful and concise customer support AI for a fictional product called the "GizmoTron 5000".
Your task is to analyze the user's request and classify it as exactly one of the following intents:
- "check_status": the user wants to know their warranty status.
- "troubleshoot": the user is having a problem and needs help.
- "create_case": the user explicitly asks to create a support ticket or case.
- "greet": the user says hello or thank you.
- "unknown": the request is not related to any of the above.

Also extract the device serial number into "reference_id" if the user provides one, or null if it is not present."#;

/// The intent-classification task for the support desk.
pub fn intent_task() -> ExtractionTask {
    let schema = IntentResult::schema(&format!("serial number, format \"{SERIAL_FORMAT}\""));
    ExtractionTask::new(INSTRUCTIONS, schema, "User Query").with_examples(vec![
        FewShotExample::new(
            "Is my GizmoTron still under warranty? The serial is GZ5K-654321.",
            json!({ "intent": "check_status", "reference_id": "GZ5K-654321" }),
        ),
        FewShotExample::new(
            "thanks a lot!",
            json!({ "intent": "greet", "reference_id": null }),
        ),
    ])
}

/// The support desk `Vertical`.
pub struct SupportDesk {
    agent: ExtractionAgent,
    task: ExtractionTask,
    router: IntentRouter,
    actions: SupportActions,
}

impl SupportDesk {
    pub fn new(agent: ExtractionAgent, store: Arc<dyn RecordStore>) -> Self {
        Self {
            agent,
            task: intent_task(),
            router: IntentRouter::new(),
            actions: SupportActions::new(store),
        }
    }

    /// Answer one line of user input.
    pub fn answer(&self, input: &str) -> String {
        self.respond(self.extract(input)).text
    }
}

impl Vertical for SupportDesk {
    type Extraction = Result<IntentResult, ExtractionError>;

    fn welcome(&self) -> String {
        "Welcome to GizmoTron 5000 Support! How can I help you? (Type 'exit' to quit)".to_string()
    }

    fn farewell(&self) -> String {
        "Thank you for contacting GizmoTron Support. Goodbye!".to_string()
    }

    fn input_prompt(&self) -> String {
        "> ".to_string()
    }

    fn input_mode(&self) -> InputMode {
        InputMode::SingleLine
    }

    fn extract(&self, input: &str) -> Self::Extraction {
        let extraction = self.agent.extract_as::<IntentResult>(input, &self.task);
        match &extraction {
            Ok(result) => debug!(
                intent = %result.intent,
                serial = ?result.reference_id,
                "support query classified"
            ),
            Err(e) => debug!(error = %e, "support query not classified"),
        }
        extraction
    }

    fn respond(&self, extraction: Self::Extraction) -> TurnReply {
        if let Err(ExtractionError::RateLimited { .. }) = extraction {
            return TurnReply::text(QUOTA_EXCEEDED);
        }

        let routed = self.router.route_extraction(&extraction);
        match self.router.dispatch(&routed, &self.actions) {
            Ok(outcome) => TurnReply::text(outcome.message()),
            Err(e) => TurnReply::text(e.to_string()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
