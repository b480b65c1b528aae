//! Declarative output schemas.
//!
//! An `OutputSchema` describes the exact JSON shape a model completion must
//! have. The same tree is rendered into the prompt so the model sees the
//! field names, types and enum literals, and compiled into a JSON Schema
//! document (`OutputSchema::json_schema`) that the parser validates against.
//!
//! Every declared field is required. "Unknown" is expressed with `null` (for
//! nullable fields) or an empty array, never by leaving the field out.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// The type of a single schema field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "of")]
pub enum FieldType {
    String,
    Number,
    /// A JSON number with no fractional part that fits in `i64`.
    Integer,
    Boolean,
    /// One of a fixed set of string literals.
    Enum(Vec<String>),
    Array(Box<FieldType>),
    Object(Vec<FieldSpec>),
    /// The inner type, or `null`.
    Nullable(Box<FieldType>),
}

impl FieldType {
    /// `T|null`.
    pub fn nullable(inner: FieldType) -> Self {
        FieldType::Nullable(Box::new(inner))
    }

    /// `[T]`.
    pub fn array_of(inner: FieldType) -> Self {
        FieldType::Array(Box::new(inner))
    }

    /// A nested object with the given fields.
    pub fn object(fields: Vec<FieldSpec>) -> Self {
        FieldType::Object(fields)
    }

    /// An enum over the given string literals.
    pub fn enum_of<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldType::Enum(literals.into_iter().map(Into::into).collect())
    }

    /// True if `null` is an acceptable value for this type.
    pub fn is_nullable(&self) -> bool {
        matches!(self, FieldType::Nullable(_))
    }

    /// The JSON Schema fragment for this type.
    ///
    /// `Nullable` widens the inner `type` to `[T, "null"]` (and adds `null`
    /// to an enum's literals) rather than wrapping it in `anyOf`, so a
    /// validation error still points at the field itself.
    pub fn to_json_schema(&self) -> Value {
        match self {
            FieldType::String => json!({ "type": "string" }),
            FieldType::Number => json!({ "type": "number" }),
            FieldType::Integer => json!({ "type": "integer" }),
            FieldType::Boolean => json!({ "type": "boolean" }),
            FieldType::Enum(literals) => json!({ "type": "string", "enum": literals }),
            FieldType::Array(inner) => json!({ "type": "array", "items": inner.to_json_schema() }),
            FieldType::Object(fields) => object_schema(fields),
            FieldType::Nullable(inner) => {
                let mut schema = inner.to_json_schema();
                if let Some(obj) = schema.as_object_mut() {
                    if let Some(Value::String(t)) = obj.get("type").cloned() {
                        obj.insert("type".to_string(), json!([t, "null"]));
                    }
                    if let Some(Value::Array(literals)) = obj.get_mut("enum") {
                        literals.push(Value::Null);
                    }
                }
                schema
            }
        }
    }
}

/// Every declared field is listed in `required`; undeclared keys are allowed.
fn object_schema(fields: &[FieldSpec]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| (f.name.clone(), f.field_type.to_json_schema()))
        .collect();
    let required: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

/// A named field inside an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub field_type: FieldType,
    /// Optional guidance rendered next to the field in prompts,
    /// e.g. `e.g. "120/80 mmHg"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            hint: None,
        }
    }

    /// Attach a prompt hint to this field.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// The full shape a completion must conform to.
///
/// The top level is always an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSchema {
    /// Stable identifier, e.g. `"intent-result-v1"`. Appears in logs.
    pub schema_id: String,
    pub fields: Vec<FieldSpec>,
}

impl OutputSchema {
    pub fn new(schema_id: impl Into<String>, fields: Vec<FieldSpec>) -> Self {
        Self {
            schema_id: schema_id.into(),
            fields,
        }
    }

    /// Render the schema as the compact pseudo-JSON shape used in prompts.
    ///
    /// ```text
    /// {
    ///   "intent": "greet"|"unknown",
    ///   "reference_id": string|null  // format GZ5K-XXXXXX
    /// }
    /// ```
    pub fn render(&self) -> String {
        render_object(&self.fields, 0)
    }

    /// The schema as a JSON Schema document with an object at the root.
    pub fn json_schema(&self) -> Value {
        object_schema(&self.fields)
    }
}

fn render_object(fields: &[FieldSpec], depth: usize) -> String {
    let pad = "  ".repeat(depth + 1);
    let mut out = String::from("{\n");
    for (idx, field) in fields.iter().enumerate() {
        let comma = if idx + 1 < fields.len() { "," } else { "" };
        out.push_str(&pad);
        out.push_str(&format!(
            "\"{}\": {}{}",
            field.name,
            render_type(&field.field_type, depth + 1),
            comma
        ));
        if let Some(hint) = &field.hint {
            out.push_str("  // ");
            out.push_str(hint);
        }
        out.push('\n');
    }
    out.push_str(&"  ".repeat(depth));
    out.push('}');
    out
}

fn render_type(field_type: &FieldType, depth: usize) -> String {
    match field_type {
        FieldType::String => "string".to_string(),
        FieldType::Number => "number".to_string(),
        FieldType::Integer => "integer".to_string(),
        FieldType::Boolean => "boolean".to_string(),
        FieldType::Enum(literals) => literals
            .iter()
            .map(|l| format!("\"{l}\""))
            .collect::<Vec<_>>()
            .join("|"),
        FieldType::Array(inner) => format!("[{}]", render_inline(inner)),
        FieldType::Object(fields) => render_object(fields, depth),
        FieldType::Nullable(inner) => format!("{}|null", render_type(inner, depth)),
    }
}

/// Objects nested in arrays are rendered on one line.
fn render_inline(field_type: &FieldType) -> String {
    match field_type {
        FieldType::Object(fields) => {
            let body = fields
                .iter()
                .map(|f| format!("\"{}\": {}", f.name, render_inline(&f.field_type)))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{body}}}")
        }
        FieldType::Array(inner) => format!("[{}]", render_inline(inner)),
        FieldType::Nullable(inner) => format!("{}|null", render_inline(inner)),
        other => render_type(other, 0),
    }
}
