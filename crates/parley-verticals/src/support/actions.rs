//! Domain actions for the support desk.
//!
//! One handler per `ActionName`. Handlers that need a serial number check it
//! is present and well formed before touching the catalog or the store, and
//! answer with a `HandlerError` whose `Display` text tells the user what to
//! provide.

use std::sync::Arc;

use serde_json::json;
use tracing::info;
use uuid::Uuid;

use parley_contracts::{
    action::{ActionArguments, ActionName, ActionOutcome, RoutedAction},
    error::HandlerError,
};
use parley_core::traits::{ActionSet, RecordStore};
use parley_store::RecordClock;

use super::catalog::{
    is_valid_serial, lookup_warranty, normalize_serial, SERIAL_FORMAT, TROUBLESHOOTING_STEPS,
};

pub const GREETING: &str = "Hello! How can I assist you with your GizmoTron 5000 today?";

pub const CLARIFICATION: &str = "I'm sorry, I'm not sure how to help with that. You can ask me \
     to check a warranty, provide troubleshooting steps, or create a ticket.";

const SERIAL_ARGUMENT: &str = "serial number";

/// Payload `kind` of tickets written to the record store.
pub const TICKET_KIND: &str = "support_ticket";

/// The support desk's `ActionSet`. Ticket creation appends to `store`.
pub struct SupportActions {
    store: Arc<dyn RecordStore>,
    clock: RecordClock,
}

impl SupportActions {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            clock: RecordClock::new(),
        }
    }

    fn check_status(&self, args: &ActionArguments) -> Result<ActionOutcome, HandlerError> {
        let serial = require_serial(
            args,
            format!("I need a serial number to check the warranty. It looks like '{SERIAL_FORMAT}'."),
        )?;

        let entry = lookup_warranty(&serial).ok_or_else(|| HandlerError::NotFound {
            kind: SERIAL_ARGUMENT.to_string(),
            reference_id: serial.clone(),
        })?;

        Ok(ActionOutcome::Reply(format!(
            "Warranty for {} is {}. It expires/expired on {}.",
            entry.serial_number, entry.status, entry.expires
        )))
    }

    fn troubleshoot(&self) -> ActionOutcome {
        ActionOutcome::Reply(format!(
            "Let's try some basic troubleshooting:\n{}",
            TROUBLESHOOTING_STEPS.join("\n")
        ))
    }

    fn create_case(&self, args: &ActionArguments) -> Result<ActionOutcome, HandlerError> {
        let serial = require_serial(
            args,
            "I can create a ticket, but I'll need the device's serial number first.".to_string(),
        )?;

        let ticket_id = new_ticket_id();
        let record = self.clock.stamp(json!({
            "kind": TICKET_KIND,
            "ticket_id": ticket_id,
            "serial_number": serial,
        }));
        self.store.append(record.clone())?;

        info!(
            ticket_id = %ticket_id,
            serial_number = %serial,
            record_id = %record.id,
            "support ticket created"
        );

        Ok(ActionOutcome::Stored {
            record,
            message: format!(
                "I've created a support ticket for you. Your ticket ID is {ticket_id}. \
                 A human agent will contact you within 24 hours."
            ),
        })
    }
}

impl ActionSet for SupportActions {
    fn handle(&self, action: &RoutedAction) -> Result<ActionOutcome, HandlerError> {
        match action.action {
            ActionName::CheckStatus => self.check_status(&action.arguments),
            ActionName::Troubleshoot => Ok(self.troubleshoot()),
            ActionName::CreateCase => self.create_case(&action.arguments),
            ActionName::Greet => Ok(ActionOutcome::Reply(GREETING.to_string())),
            ActionName::Clarify => Ok(ActionOutcome::Reply(CLARIFICATION.to_string())),
        }
    }
}

/// The normalized serial number from `args`, or the matching clarification.
fn require_serial(args: &ActionArguments, missing_guidance: String) -> Result<String, HandlerError> {
    let raw = args
        .reference_id
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| HandlerError::MissingArgument {
            argument: SERIAL_ARGUMENT.to_string(),
            guidance: missing_guidance,
        })?;

    let serial = normalize_serial(raw);
    if !is_valid_serial(&serial) {
        return Err(HandlerError::InvalidArgument {
            argument: SERIAL_ARGUMENT.to_string(),
            value: raw.trim().to_string(),
            expected: SERIAL_FORMAT.to_string(),
        });
    }
    Ok(serial)
}

/// `TICKET-` followed by 12 upper-case hex digits of a v4 UUID.
fn new_ticket_id() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    format!("TICKET-{}", &hex[..12])
}

// ── Tests ─────────────────────────────────────────────────────────────────────
