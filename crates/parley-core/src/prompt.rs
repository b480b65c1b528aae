//! Schema-constrained prompt construction.
//!
//! A prompt is assembled from four parts, always in this order:
//!
//!   instructions → rendered schema → few-shot examples → user input → final directive
//!
//! The fallback prompt used on retry is the same text prefixed with
//! `FALLBACK_DIRECTIVE`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use parley_contracts::schema::OutputSchema;

/// Prepended to the primary prompt when the first completion was unusable.
pub const FALLBACK_DIRECTIVE: &str = "Return only a single-line JSON object following this schema \
     (no explanations). If you cannot determine a field, use null or empty arrays.";

/// Closes every prompt.
pub const FINAL_DIRECTIVE: &str = "Now produce the JSON according to the schema above. \
     Return ONLY the JSON object: no markdown, no code fences, no commentary.";

/// An (input, expected output) pair rendered into the prompt to bias the
/// model toward the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FewShotExample {
    pub input: String,
    /// Must conform to the task's schema.
    pub output: Value,
}

impl FewShotExample {
    pub fn new(input: impl Into<String>, output: Value) -> Self {
        Self {
            input: input.into(),
            output,
        }
    }
}

/// Everything the extraction agent needs besides the user's text.
#[derive(Debug, Clone)]
pub struct ExtractionTask {
    /// Natural-language description of the task.
    pub instructions: String,
    pub schema: OutputSchema,
    /// Zero or more priming examples.
    pub examples: Vec<FewShotExample>,
    /// What the user text is called in the prompt, e.g. "Transcript".
    pub input_label: String,
}

impl ExtractionTask {
    pub fn new(
        instructions: impl Into<String>,
        schema: OutputSchema,
        input_label: impl Into<String>,
    ) -> Self {
        Self {
            instructions: instructions.into(),
            schema,
            examples: Vec::new(),
            input_label: input_label.into(),
        }
    }

    pub fn with_examples(mut self, examples: Vec<FewShotExample>) -> Self {
        self.examples = examples;
        self
    }

    /// Build the primary prompt for `user_text`.
    pub fn build_prompt(&self, user_text: &str) -> String {
        let mut prompt = String::new();

        prompt.push_str(self.instructions.trim());
        prompt.push_str("\n\n");

        prompt.push_str(
            "Required JSON schema (fields must exist; use null or empty arrays when unknown):\n",
        );
        prompt.push_str(&self.schema.render());
        prompt.push_str("\n\n");

        for (idx, example) in self.examples.iter().enumerate() {
            let n = idx + 1;
            prompt.push_str(&format!("Example {} {}:\n{}\n\n", self.input_label, n, example.input));
            // Value's Display is compact JSON.
            prompt.push_str(&format!("Example Output {} JSON:\n{}\n\n", n, example.output));
        }

        prompt.push_str(&format!("{} to parse:\n{}\n\n", self.input_label, user_text.trim()));
        prompt.push_str(FINAL_DIRECTIVE);
        prompt
    }
}

/// The stricter prompt used for the fallback attempt.
pub fn reinforce(prompt: &str) -> String {
    format!("{FALLBACK_DIRECTIVE}\n\n{prompt}")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use parley_contracts::intent::IntentResult;

    use super::*;

    fn task() -> ExtractionTask {
        ExtractionTask::new(
            "Classify the user's request.",
            IntentResult::schema("format \"GZ5K-XXXXXX\""),
            "User query",
        )
    }

    #[test]
    fn test_prompt_parts_appear_in_order() {
        let task = task().with_examples(vec![FewShotExample::new(
            "hi there",
            json!({ "intent": "greet", "reference_id": null }),
        )]);

        let prompt = task.build_prompt("  my gizmo is broken  ");

        let instructions = prompt.find("Classify the user's request.").unwrap();
        let schema = prompt.find("\"intent\":").unwrap();
        let example = prompt.find("Example User query 1:\nhi there").unwrap();
        let example_json = prompt
            .find("Example Output 1 JSON:\n{\"intent\":\"greet\",\"reference_id\":null}")
            .unwrap();
        let input = prompt.find("User query to parse:\nmy gizmo is broken").unwrap();
        let directive = prompt.find(FINAL_DIRECTIVE).unwrap();

        assert!(instructions < schema);
        assert!(schema < example);
        assert!(example < example_json);
        assert!(example_json < input);
        assert!(input < directive);
        assert!(prompt.ends_with(FINAL_DIRECTIVE));
    }

    #[test]
    fn test_prompt_without_examples_has_no_example_blocks() {
        let prompt = task().build_prompt("hello");
        assert!(!prompt.contains("Example "));
        assert!(prompt.contains("User query to parse:\nhello"));
    }

    #[test]
    fn test_reinforced_prompt_keeps_primary_content() {
        let primary = task().build_prompt("hello");
        let fallback = reinforce(&primary);
        assert!(fallback.starts_with(FALLBACK_DIRECTIVE));
        assert!(fallback.ends_with(&primary));
    }
}
