//! # parley-contracts
//!
//! Shared types, output schemas, and error contracts for the Parley
//! extraction and routing pipeline.
//!
//! All crates in the workspace import from here. No pipeline logic lives in
//! this crate, only data definitions, schema rendering and error types.

pub mod action;
pub mod error;
pub mod intent;
pub mod record;
pub mod schema;
pub mod value;

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use action::{ActionName, RoutedAction};
    use error::{ExtractionError, HandlerError, ParseError, StoreError};
    use intent::{Intent, IntentResult};
    use record::{DomainRecord, Gender};
    use schema::{FieldSpec, FieldType, OutputSchema};
    use value::StructuredValue;

    // ── Intent ───────────────────────────────────────────────────────────────

    #[test]
    fn test_intent_wire_names_match_serde() {
        for intent in Intent::ALL {
            let encoded = serde_json::to_value(intent).unwrap();
            assert_eq!(encoded, json!(intent.as_str()));
        }
    }

    #[test]
    fn test_intent_result_decodes_null_reference() {
        let value = StructuredValue::conformed(json!({
            "intent": "greet",
            "reference_id": null
        }));
        let result: IntentResult = value.decode().unwrap();
        assert_eq!(result.intent, Intent::Greet);
        assert_eq!(result.reference_id, None);
    }

    #[test]
    fn test_intent_schema_lists_every_literal() {
        let rendered = IntentResult::schema("format \"GZ5K-XXXXXX\"").render();
        for intent in Intent::ALL {
            assert!(
                rendered.contains(&format!("\"{}\"", intent.as_str())),
                "rendered schema should list {intent}: {rendered}"
            );
        }
        assert!(rendered.contains("\"reference_id\": string|null"));
        assert!(rendered.contains("// format \"GZ5K-XXXXXX\""));
    }

    // ── Schema rendering ─────────────────────────────────────────────────────

    #[test]
    fn test_render_nested_object_and_inline_array_items() {
        let schema = OutputSchema::new(
            "render-test",
            vec![
                FieldSpec::new(
                    "patient",
                    FieldType::object(vec![FieldSpec::new(
                        "age",
                        FieldType::nullable(FieldType::Integer),
                    )]),
                ),
                FieldSpec::new(
                    "medications",
                    FieldType::array_of(FieldType::object(vec![
                        FieldSpec::new("name", FieldType::String),
                        FieldSpec::new("dose", FieldType::nullable(FieldType::String)),
                    ])),
                ),
            ],
        );

        let expected = "{\n  \"patient\": {\n    \"age\": integer|null\n  },\n  \"medications\": [{\"name\": string, \"dose\": string|null}]\n}";
        assert_eq!(schema.render(), expected);
    }

    #[test]
    fn test_render_nullable_enum() {
        let schema = OutputSchema::new(
            "enum-test",
            vec![FieldSpec::new(
                "gender",
                FieldType::nullable(FieldType::enum_of(["male", "female"])),
            )],
        );
        assert!(schema.render().contains("\"gender\": \"male\"|\"female\"|null"));
    }

    #[test]
    fn test_json_schema_requires_every_field_and_widens_nullables() {
        let schema = OutputSchema::new(
            "json-schema-test",
            vec![
                FieldSpec::new("gender", FieldType::nullable(FieldType::enum_of(["male"]))),
                FieldSpec::new(
                    "doses",
                    FieldType::array_of(FieldType::object(vec![FieldSpec::new(
                        "mg",
                        FieldType::nullable(FieldType::Integer),
                    )])),
                ),
            ],
        );

        assert_eq!(
            schema.json_schema(),
            json!({
                "type": "object",
                "properties": {
                    "gender": { "type": ["string", "null"], "enum": ["male", null] },
                    "doses": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": { "mg": { "type": ["integer", "null"] } },
                            "required": ["mg"]
                        }
                    }
                },
                "required": ["gender", "doses"]
            })
        );
    }

    #[test]
    fn test_domain_record_schema_has_four_sections() {
        let schema = DomainRecord::schema();
        let names: Vec<&str> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["patient", "vitals", "findings", "plan"]);
    }

    #[test]
    fn test_domain_record_decodes_nullable_leaves() {
        let value = StructuredValue::conformed(json!({
            "patient": { "name": null, "age": 62, "gender": "female" },
            "vitals": {
                "temperature_c": 38.5,
                "heart_rate_bpm": null,
                "respiratory_rate_bpm": null,
                "blood_pressure": null
            },
            "findings": {
                "symptoms": ["cough"],
                "medications": [{ "name": "lisinopril", "dose": "10 mg", "frequency": null }],
                "allergies": [],
                "assessment": null
            },
            "plan": { "treatment": null, "follow_up": null }
        }));

        let record: DomainRecord = value.decode().unwrap();
        assert_eq!(record.patient.age, Some(62));
        assert_eq!(record.patient.gender, Some(Gender::Female));
        assert_eq!(record.vitals.temperature_c, Some(38.5));
        assert_eq!(record.findings.medications[0].frequency, None);
        assert!(record.findings.allergies.is_empty());
    }

    // ── Actions ──────────────────────────────────────────────────────────────

    #[test]
    fn test_clarify_action_has_no_arguments() {
        let action = RoutedAction::clarify();
        assert_eq!(action.action, ActionName::Clarify);
        assert_eq!(action.arguments.reference_id, None);
    }

    // ── Error display messages ───────────────────────────────────────────────

    #[test]
    fn test_schema_mismatch_display_names_path() {
        let err = ParseError::mismatch("$.patient.age", "expected integer");
        let msg = err.to_string();
        assert!(msg.contains("$.patient.age"));
        assert!(msg.contains("expected integer"));
    }

    #[test]
    fn test_unparseable_display_counts_attempts() {
        let err = ExtractionError::Unparseable {
            last_raw_completion: "not json".to_string(),
            attempts: 2,
            reason: "completion is not valid JSON".to_string(),
        };
        assert!(err.to_string().contains("2 attempt(s)"));
    }

    #[test]
    fn test_handler_errors_render_user_text() {
        let missing = HandlerError::MissingArgument {
            argument: "serial number".to_string(),
            guidance: "Please give me the serial number.".to_string(),
        };
        assert_eq!(missing.to_string(), "Please give me the serial number.");

        let not_found = HandlerError::NotFound {
            kind: "serial number".to_string(),
            reference_id: "GZ5K-000000".to_string(),
        };
        assert_eq!(
            not_found.to_string(),
            "Sorry, I could not find a record for serial number GZ5K-000000."
        );

        let store: HandlerError = StoreError::Unavailable {
            reason: "disk full".to_string(),
        }
        .into();
        assert!(store.to_string().contains("disk full"));
    }
}
