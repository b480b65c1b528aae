//! The extraction agent: schema-constrained prompting with a bounded retry.
//!
//! Every call to `extract()` runs this sequence:
//!
//!   build prompt → generate → parse → [reinforce → generate → parse]* → value | error
//!
//! The bracketed fallback runs at most `max_retries` times (default 1). There
//! is no backoff. Any failed attempt consumes a fallback, a rate-limit
//! rejection included; if the last attempt was rate limited the caller gets
//! `RateLimited` rather than `Unparseable`.

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use parley_contracts::{
    error::{ClientError, ExtractionError, ParseError},
    schema::OutputSchema,
    value::StructuredValue,
};

use crate::prompt::{reinforce, ExtractionTask};
use crate::traits::{LanguageModelClient, OutputParser};

/// Fallback attempts allowed after the primary call.
pub const DEFAULT_MAX_RETRIES: u32 = 1;

/// Why one attempt did not produce a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    Client(ClientError),
    Parse(ParseError),
}

impl std::fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptFailure::Client(e) => write!(f, "{e}"),
            AttemptFailure::Parse(e) => write!(f, "{e}"),
        }
    }
}

/// One prompt/completion/parse round. Lives only for the duration of the
/// `extract()` call that produced it.
#[derive(Debug)]
pub struct ExtractionAttempt {
    /// 1 for the primary call, 2.. for fallbacks.
    pub attempt: u32,
    pub prompt_text: String,
    /// `None` when the client failed before producing text.
    pub raw_completion: Option<String>,
    pub outcome: Result<StructuredValue, AttemptFailure>,
}

/// Drives a language model toward a schema-conforming value.
///
/// Holds no per-call state: nothing from one `extract()` call is remembered
/// by the next.
pub struct ExtractionAgent {
    client: Box<dyn LanguageModelClient>,
    parser: Box<dyn OutputParser>,
    max_retries: u32,
}

impl ExtractionAgent {
    /// Create an agent with the default retry bound.
    pub fn new(client: Box<dyn LanguageModelClient>, parser: Box<dyn OutputParser>) -> Self {
        Self {
            client,
            parser,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    /// Set how many fallback attempts follow a failed primary attempt.
    /// Zero disables the fallback.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Extract a value conforming to `task.schema` from `user_text`.
    ///
    /// # Errors
    ///
    /// - `ExtractionError::RateLimited` when every attempt failed and the last
    ///   one was a quota rejection.
    /// - `ExtractionError::Unparseable` after `1 + max_retries` failed
    ///   attempts otherwise, carrying the last completion the model returned.
    pub fn extract(
        &self,
        user_text: &str,
        task: &ExtractionTask,
    ) -> Result<StructuredValue, ExtractionError> {
        self.run(user_text, task).map(|(value, _)| value)
    }

    /// `extract()` followed by decoding into a typed view.
    pub fn extract_as<T: DeserializeOwned>(
        &self,
        user_text: &str,
        task: &ExtractionTask,
    ) -> Result<T, ExtractionError> {
        let (value, attempts) = self.run(user_text, task)?;
        value.decode().map_err(|e| ExtractionError::Unparseable {
            last_raw_completion: value.as_value().to_string(),
            attempts,
            reason: e.to_string(),
        })
    }

    /// The retry loop. On success also returns the number of attempts made.
    fn run(
        &self,
        user_text: &str,
        task: &ExtractionTask,
    ) -> Result<(StructuredValue, u32), ExtractionError> {
        let primary = task.build_prompt(user_text);
        let total_attempts = self.max_retries.saturating_add(1);

        let mut last_raw = String::new();
        let mut last_failure = String::new();
        let mut rate_limit: Option<String> = None;

        for attempt in 1..=total_attempts {
            let prompt_text = if attempt == 1 {
                primary.clone()
            } else {
                reinforce(&primary)
            };

            let round = self.attempt(attempt, prompt_text, &task.schema);
            if let Some(raw) = round.raw_completion {
                last_raw = raw;
            }

            match round.outcome {
                Ok(value) => {
                    debug!(
                        schema_id = %task.schema.schema_id,
                        attempt,
                        "extraction succeeded"
                    );
                    return Ok((value, attempt));
                }
                Err(AttemptFailure::Client(ClientError::RateLimited { detail })) => {
                    warn!(
                        schema_id = %task.schema.schema_id,
                        attempt,
                        remaining = total_attempts - attempt,
                        %detail,
                        "model rate limited"
                    );
                    last_failure = format!("rate limited: {detail}");
                    rate_limit = Some(detail);
                }
                Err(failure) => {
                    warn!(
                        schema_id = %task.schema.schema_id,
                        attempt,
                        remaining = total_attempts - attempt,
                        error = %failure,
                        "extraction attempt failed"
                    );
                    last_failure = failure.to_string();
                    rate_limit = None;
                }
            }
        }

        if let Some(detail) = rate_limit {
            return Err(ExtractionError::RateLimited { detail });
        }

        Err(ExtractionError::Unparseable {
            last_raw_completion: last_raw,
            attempts: total_attempts,
            reason: last_failure,
        })
    }

    fn attempt(&self, attempt: u32, prompt_text: String, schema: &OutputSchema) -> ExtractionAttempt {
        debug!(
            schema_id = %schema.schema_id,
            attempt,
            prompt_chars = prompt_text.len(),
            "calling language model"
        );

        let (raw_completion, outcome) = match self.client.generate(&prompt_text) {
            Ok(raw) => {
                debug!(attempt, raw_chars = raw.len(), "completion received");
                let outcome = self.parser.parse(&raw, schema).map_err(AttemptFailure::Parse);
                (Some(raw), outcome)
            }
            Err(e) => (None, Err(AttemptFailure::Client(e))),
        };

        ExtractionAttempt {
            attempt,
            prompt_text,
            raw_completion,
            outcome,
        }
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
