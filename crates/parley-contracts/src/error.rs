//! Error taxonomy for the Parley pipeline.
//!
//! Each seam has its own error type so callers can tell recoverable failures
//! (client and parse errors, retried inside the extraction agent) from the
//! ones that reach the user as text (store and handler errors).

use thiserror::Error;

/// Failure of a single language-model call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The provider rejected the call for quota or rate reasons.
    #[error("rate limited by model provider: {detail}")]
    RateLimited { detail: String },

    /// Transport failure, unexpected status, or an empty response.
    #[error("model call failed: {reason}")]
    Other { reason: String },
}

/// Failure to turn a raw completion into a schema-conforming value.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The normalized text is not valid JSON.
    #[error("completion is not valid JSON: {reason}")]
    Syntax { reason: String },

    /// The JSON does not match the declared schema at `field_path`.
    #[error("schema mismatch at {field_path}: {reason}")]
    SchemaMismatch { field_path: String, reason: String },
}

impl ParseError {
    pub fn mismatch(field_path: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::SchemaMismatch {
            field_path: field_path.into(),
            reason: reason.into(),
        }
    }
}

/// Failure of a whole extraction, after retries.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    /// Every attempt failed. Carries the last completion seen (empty when the
    /// last attempt failed before the model produced any text).
    #[error("model output could not be parsed after {attempts} attempt(s): {reason}")]
    Unparseable {
        last_raw_completion: String,
        attempts: u32,
        reason: String,
    },

    /// Every attempt failed and the last one hit a quota/rate limit.
    #[error("model quota exceeded: {detail}")]
    RateLimited { detail: String },
}

/// Failure of the record store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("record store unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Failure of a domain action handler.
///
/// `Display` output is written for the end user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HandlerError {
    /// A required argument was not extracted. `guidance` tells the user what
    /// to provide.
    #[error("{guidance}")]
    MissingArgument { argument: String, guidance: String },

    /// An argument was present but does not have the expected format.
    #[error("'{value}' doesn't look like a valid {argument}. It should look like '{expected}'.")]
    InvalidArgument {
        argument: String,
        value: String,
        expected: String,
    },

    /// No record exists for the given reference.
    #[error("Sorry, I could not find a record for {kind} {reference_id}.")]
    NotFound { kind: String, reference_id: String },

    #[error("Sorry, I couldn't save that right now ({0}).")]
    Store(#[from] StoreError),
}

/// Process-level failures surfaced by the binary at startup.
#[derive(Debug, Error)]
pub enum ParleyError {
    /// A required configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used by the binary and configuration loaders.
pub type ParleyResult<T> = Result<T, ParleyError>;
