//! Routed actions and handler outcomes.
//!
//! The router turns an `IntentResult` into a `RoutedAction`; an action set
//! turns a `RoutedAction` into an `ActionOutcome`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::StoredRecord;

/// The closed set of actions a router can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionName {
    CheckStatus,
    Troubleshoot,
    CreateCase,
    Greet,
    /// The default action: ask the user to rephrase.
    Clarify,
}

impl ActionName {
    pub const ALL: [ActionName; 5] = [
        ActionName::CheckStatus,
        ActionName::Troubleshoot,
        ActionName::CreateCase,
        ActionName::Greet,
        ActionName::Clarify,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionName::CheckStatus => "check_status",
            ActionName::Troubleshoot => "troubleshoot",
            ActionName::CreateCase => "create_case",
            ActionName::Greet => "greet",
            ActionName::Clarify => "clarify",
        }
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Arguments extracted from the utterance and handed to the handler as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionArguments {
    pub reference_id: Option<String>,
}

/// An action selected by the router, with its arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutedAction {
    pub action: ActionName,
    pub arguments: ActionArguments,
}

impl RoutedAction {
    /// The default action with no arguments.
    pub fn clarify() -> Self {
        Self {
            action: ActionName::Clarify,
            arguments: ActionArguments::default(),
        }
    }
}

/// What a handler produced.
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    /// Plain text for the user.
    Reply(String),
    /// A record was appended to the store; `message` is shown to the user.
    Stored {
        record: StoredRecord,
        message: String,
    },
}

impl ActionOutcome {
    /// The text shown to the user for this outcome.
    pub fn message(&self) -> &str {
        match self {
            ActionOutcome::Reply(text) => text,
            ActionOutcome::Stored { message, .. } => message,
        }
    }
}
