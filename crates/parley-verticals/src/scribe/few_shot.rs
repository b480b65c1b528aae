//! Priming examples for transcript extraction.
//!
//! Both transcripts and their EHR outputs are fictional.

use serde_json::json;

use parley_core::prompt::FewShotExample;

pub fn transcript_examples() -> Vec<FewShotExample> {
    vec![
        FewShotExample::new(
            "Dr: How old are you? Patient: I'm 62 years old. \
             Patient: I've had a cough and fever for three days, temperature went up to 38.5. \
             Dr: Any medications? Patient: I'm taking lisinopril 10 mg daily. \
             Patient: I'm allergic to penicillin.",
            json!({
                "patient": { "name": null, "age": 62, "gender": null },
                "vitals": {
                    "temperature_c": 38.5,
                    "heart_rate_bpm": null,
                    "respiratory_rate_bpm": null,
                    "blood_pressure": null
                },
                "findings": {
                    "symptoms": ["cough", "fever"],
                    "medications": [
                        { "name": "lisinopril", "dose": "10 mg", "frequency": "daily" }
                    ],
                    "allergies": ["penicillin"],
                    "assessment": "Acute cough with fever; possible infectious etiology."
                },
                "plan": {
                    "treatment": "Symptomatic treatment; consider chest X-ray if symptoms persist or worsen; consider antipyretic.",
                    "follow_up": "Return if worse or follow-up in 48-72 hours."
                }
            }),
        ),
        FewShotExample::new(
            "Patient: Hi, I'm Maria Silva, I'm 29. Doctor: What brings you in? \
             Patient: I've had headaches and dizziness for two weeks. No meds. \
             Doctor: Any known allergies? Patient: No.",
            json!({
                "patient": { "name": "Maria Silva", "age": 29, "gender": null },
                "vitals": {
                    "temperature_c": null,
                    "heart_rate_bpm": null,
                    "respiratory_rate_bpm": null,
                    "blood_pressure": null
                },
                "findings": {
                    "symptoms": ["headache", "dizziness"],
                    "medications": [],
                    "allergies": [],
                    "assessment": "Chronic headaches and dizziness; differential includes tension headache, migraine, or vestibular causes."
                },
                "plan": {
                    "treatment": "Recommend neurological exam, consider migraine therapy, advise hydration and sleep hygiene.",
                    "follow_up": "Neurology referral if no improvement in 2 weeks."
                }
            }),
        ),
    ]
}
