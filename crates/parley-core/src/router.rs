//! Deterministic intent routing.
//!
//! The router is a total function from `Intent` to `ActionName`. Every intent
//! maps to exactly one action and no two intents share one; `unknown` and any
//! failed extraction both land on `Clarify`. The reference id is handed
//! through untouched: format checks belong to the handler.

use tracing::debug;

use parley_contracts::{
    action::{ActionArguments, ActionName, ActionOutcome, RoutedAction},
    error::{ExtractionError, HandlerError},
    intent::{Intent, IntentResult},
};

use crate::traits::ActionSet;

/// Stateless intent router.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentRouter;

impl IntentRouter {
    pub fn new() -> Self {
        Self
    }

    /// The action selected for `intent`.
    pub fn action_for(intent: Intent) -> ActionName {
        match intent {
            Intent::CheckStatus => ActionName::CheckStatus,
            Intent::Troubleshoot => ActionName::Troubleshoot,
            Intent::CreateCase => ActionName::CreateCase,
            Intent::Greet => ActionName::Greet,
            Intent::Unknown => ActionName::Clarify,
        }
    }

    /// Route one classified utterance.
    pub fn route(&self, result: &IntentResult) -> RoutedAction {
        let action = Self::action_for(result.intent);
        debug!(
            intent = %result.intent,
            action = %action,
            reference_id = ?result.reference_id,
            "intent routed"
        );
        RoutedAction {
            action,
            arguments: ActionArguments {
                reference_id: result.reference_id.clone(),
            },
        }
    }

    /// Route the outcome of an extraction. Failures take the same path as
    /// `Intent::Unknown`.
    pub fn route_extraction(
        &self,
        extraction: &Result<IntentResult, ExtractionError>,
    ) -> RoutedAction {
        match extraction {
            Ok(result) => self.route(result),
            Err(e) => {
                debug!(error = %e, "extraction failed; routing to clarify");
                self.route(&IntentResult::unknown())
            }
        }
    }

    /// Invoke the handler for `action`.
    pub fn dispatch(
        &self,
        action: &RoutedAction,
        actions: &dyn ActionSet,
    ) -> Result<ActionOutcome, HandlerError> {
        actions.handle(action)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use parley_contracts::{
        action::{ActionName, ActionOutcome, RoutedAction},
        error::{ExtractionError, HandlerError},
        intent::{Intent, IntentResult},
    };

    use crate::traits::ActionSet;

    use super::IntentRouter;

    #[test]
    fn test_every_intent_routes_to_a_distinct_action() {
        let router = IntentRouter::new();
        let mut seen = HashSet::new();

        for intent in Intent::ALL {
            let routed = router.route(&IntentResult {
                intent,
                reference_id: None,
            });
            assert!(
                seen.insert(routed.action),
                "action {} reached by more than one intent",
                routed.action
            );
        }

        assert_eq!(seen.len(), ActionName::ALL.len());
    }

    #[test]
    fn test_unknown_and_extraction_failure_share_default_action() {
        let router = IntentRouter::new();

        let from_unknown = router.route_extraction(&Ok(IntentResult::unknown()));
        let from_failure = router.route_extraction(&Err(ExtractionError::Unparseable {
            last_raw_completion: "not json".to_string(),
            attempts: 2,
            reason: "syntax".to_string(),
        }));
        let from_rate_limit = router.route_extraction(&Err(ExtractionError::RateLimited {
            detail: "429".to_string(),
        }));

        assert_eq!(from_unknown, RoutedAction::clarify());
        assert_eq!(from_failure, RoutedAction::clarify());
        assert_eq!(from_rate_limit, RoutedAction::clarify());
    }

    #[test]
    fn test_reference_id_passes_through_unvalidated() {
        let router = IntentRouter::new();
        let routed = router.route(&IntentResult {
            intent: Intent::CheckStatus,
            reference_id: Some("definitely not a serial".to_string()),
        });

        assert_eq!(routed.action, ActionName::CheckStatus);
        assert_eq!(
            routed.arguments.reference_id.as_deref(),
            Some("definitely not a serial")
        );
    }

    /// Records the actions it was asked to handle.
    struct RecordingActions {
        handled: Arc<Mutex<Vec<ActionName>>>,
    }

    impl ActionSet for RecordingActions {
        fn handle(&self, action: &RoutedAction) -> Result<ActionOutcome, HandlerError> {
            self.handled.lock().unwrap().push(action.action);
            Ok(ActionOutcome::Reply(format!("handled {}", action.action)))
        }
    }

    #[test]
    fn test_dispatch_invokes_exactly_one_handler() {
        let handled = Arc::new(Mutex::new(vec![]));
        let actions = RecordingActions {
            handled: handled.clone(),
        };
        let router = IntentRouter::new();

        let routed = router.route(&IntentResult {
            intent: Intent::Troubleshoot,
            reference_id: None,
        });
        let outcome = router.dispatch(&routed, &actions).unwrap();

        assert_eq!(outcome.message(), "handled troubleshoot");
        assert_eq!(*handled.lock().unwrap(), vec![ActionName::Troubleshoot]);
    }
}
