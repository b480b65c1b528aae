//! Seam traits for the Parley pipeline.
//!
//! These four traits are the complete boundary between the core and its
//! collaborators:
//!
//! - `LanguageModelClient`: untrusted text generator (a hosted LLM)
//! - `OutputParser`: turns raw completions into schema-conforming values
//! - `RecordStore`: append-only record sink
//! - `ActionSet`: the deterministic domain handlers
//!
//! The extraction agent wires the first two together; the router hands its
//! result to an `ActionSet`, whose handlers may write to a `RecordStore`.

use parley_contracts::{
    action::{ActionOutcome, RoutedAction},
    error::{ClientError, HandlerError, ParseError, StoreError},
    record::StoredRecord,
    schema::OutputSchema,
    value::StructuredValue,
};

/// A text-in, text-out language model.
///
/// Implementations must not retry or cache; the extraction agent owns the
/// retry policy. The returned string is untrusted and may be malformed.
pub trait LanguageModelClient: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// Quota and rate-limit rejections must be reported as
    /// `ClientError::RateLimited` so the user can be told the quota ran out.
    fn generate(&self, prompt: &str) -> Result<String, ClientError>;
}

/// Converts raw model text into a value conforming to an `OutputSchema`.
pub trait OutputParser: Send + Sync {
    /// Parse `raw` and check it against `schema`.
    ///
    /// Conformance failures are reported, never silently repaired.
    fn parse(&self, raw: &str, schema: &OutputSchema) -> Result<StructuredValue, ParseError>;
}

/// An append-only sequence of stored records.
///
/// Records are never modified or deleted once appended. Implementations make
/// no transactional promise; a single interactive session is assumed.
pub trait RecordStore: Send + Sync {
    /// Append one record to the end of the sequence.
    fn append(&self, record: StoredRecord) -> Result<(), StoreError>;

    /// Return every record in append order.
    fn list_all(&self) -> Result<Vec<StoredRecord>, StoreError>;
}

/// The closed set of deterministic domain handlers.
///
/// Handlers that need a reference id validate its presence and format
/// themselves and report problems as `HandlerError`s whose `Display` text is
/// shown to the user.
pub trait ActionSet: Send + Sync {
    fn handle(&self, action: &RoutedAction) -> Result<ActionOutcome, HandlerError>;
}
