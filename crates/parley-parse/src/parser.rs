//! Schema parser for raw model completions.
//!
//! `SchemaParser` implements the `OutputParser` trait from `parley-core`.
//! Parsing runs in three phases:
//!
//! 1. **Normalize**: trim, strip one paired code fence (any language tag),
//!    trim again.
//! 2. **Structural**: parse the normalized text as JSON.
//! 3. **Conformance**: validate the JSON with `jsonschema` against the
//!    document compiled from the `OutputSchema`. Every declared field must be
//!    present and type-correct; `null` is accepted only where the schema says
//!    nullable.
//!
//! The parser never coerces. JSON Schema already rejects a numeric string
//! where a number is expected; integer fields additionally reject `62.0` and
//! anything outside `i64`. A failed completion is reported so the extraction
//! agent's retry is the single recovery mechanism.

use jsonschema::error::ValidationErrorKind;
use serde_json::Value;
use tracing::{debug, warn};

use parley_contracts::{
    error::ParseError,
    schema::{FieldType, OutputSchema},
    value::StructuredValue,
};
use parley_core::traits::OutputParser;

const FENCE: &str = "```";

/// Root of every field path reported in `ParseError::SchemaMismatch`.
const ROOT_PATH: &str = "$";

/// The Parley completion parser.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaParser;

impl SchemaParser {
    pub fn new() -> Self {
        Self
    }

    // ── Phase 1: normalization ───────────────────────────────────────────────

    /// Trim `raw` and unwrap it from a paired code fence if it has one.
    ///
    /// An unpaired fence is left alone; it will fail the structural parse.
    pub fn normalize(raw: &str) -> &str {
        let text = raw.trim();
        match Self::strip_fence(text) {
            Some(inner) => inner.trim(),
            None => text,
        }
    }

    fn strip_fence(text: &str) -> Option<&str> {
        let inner = text.strip_prefix(FENCE)?.strip_suffix(FENCE)?;

        // A language tag is a run of identifier-ish characters directly after
        // the opening fence, terminated by whitespace.
        let tag_len = inner
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '-')))
            .unwrap_or(inner.len());
        let rest = &inner[tag_len..];
        if tag_len > 0 && rest.starts_with(char::is_whitespace) {
            Some(rest)
        } else {
            Some(inner)
        }
    }

    // ── Phase 3: conformance ─────────────────────────────────────────────────

    /// Check `value` against `schema`, reporting the first violation.
    pub fn conform(value: &Value, schema: &OutputSchema) -> Result<(), ParseError> {
        let document = schema.json_schema();
        let validator = jsonschema::validator_for(&document).map_err(|e| {
            warn!(schema_id = %schema.schema_id, error = %e, "schema compilation failure");
            ParseError::mismatch(ROOT_PATH, format!("invalid JSON Schema document: {e}"))
        })?;

        if let Some(error) = validator.iter_errors(value).next() {
            let mut path = field_path(value, &error.instance_path.to_string());
            let reason = match &error.kind {
                ValidationErrorKind::Required { property } => {
                    path.push('.');
                    path.push_str(property.as_str().unwrap_or_default());
                    "required field is missing (use null or [] for unknown values)".to_string()
                }
                _ => error.to_string(),
            };
            return Err(ParseError::mismatch(path, reason));
        }

        for field in &schema.fields {
            if let Some(child) = value.get(&field.name) {
                check_integers(child, &field.field_type, &format!("{ROOT_PATH}.{}", field.name))?;
            }
        }
        Ok(())
    }
}

impl OutputParser for SchemaParser {
    /// Normalize, parse and check `raw` against `schema`.
    fn parse(&self, raw: &str, schema: &OutputSchema) -> Result<StructuredValue, ParseError> {
        let normalized = Self::normalize(raw);

        // ── Phase 2: structural parse ────────────────────────────────────────
        let value: Value = serde_json::from_str(normalized).map_err(|e| {
            warn!(schema_id = %schema.schema_id, error = %e, "completion is not valid JSON");
            ParseError::Syntax {
                reason: e.to_string(),
            }
        })?;

        if let Err(e) = Self::conform(&value, schema) {
            warn!(schema_id = %schema.schema_id, error = %e, "completion does not match schema");
            return Err(e);
        }

        debug!(schema_id = %schema.schema_id, "completion conforms to schema");
        Ok(StructuredValue::conformed(value))
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

/// Turn a JSON pointer (`/findings/medications/1/name`) into a field path
/// (`$.findings.medications[1].name`), using `value` to tell array indices
/// from object keys.
fn field_path(value: &Value, pointer: &str) -> String {
    let mut path = ROOT_PATH.to_string();
    let mut node = Some(value);
    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");
        match node {
            Some(Value::Array(items)) => {
                path.push_str(&format!("[{segment}]"));
                node = segment.parse::<usize>().ok().and_then(|idx| items.get(idx));
            }
            Some(parent) => {
                path.push('.');
                path.push_str(&segment);
                node = parent.get(segment.as_str());
            }
            None => {
                path.push('.');
                path.push_str(&segment);
            }
        }
    }
    path
}

/// JSON Schema accepts `62.0` and values above `i64::MAX` as integers; the
/// typed views decode integers as `i64`, so both are rejected here.
fn check_integers(value: &Value, field_type: &FieldType, path: &str) -> Result<(), ParseError> {
    match field_type {
        FieldType::Integer if value.is_number() && !value.is_i64() => Err(ParseError::mismatch(
            path,
            format!("expected a 64-bit integer, found {value}"),
        )),
        FieldType::Nullable(inner) => check_integers(value, inner, path),
        FieldType::Array(inner) => match value.as_array() {
            Some(items) => items
                .iter()
                .enumerate()
                .try_for_each(|(idx, item)| check_integers(item, inner, &format!("{path}[{idx}]"))),
            None => Ok(()),
        },
        FieldType::Object(fields) => fields.iter().try_for_each(|field| match value.get(&field.name) {
            Some(child) => check_integers(child, &field.field_type, &format!("{path}.{}", field.name)),
            None => Ok(()),
        }),
        _ => Ok(()),
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
