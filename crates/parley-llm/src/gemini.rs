//! Gemini `generateContent` client.
//!
//! One blocking POST per `generate` call:
//!
//! ```text
//! POST {endpoint}/{model}:generateContent?key=…
//! {"contents":[{"parts":[{"text": prompt}]}]}
//! ```
//!
//! The completion is the concatenated text of the first candidate's parts.
//! Quota failures (HTTP 429 or an error body with status
//! `RESOURCE_EXHAUSTED`) map to `ClientError::RateLimited`; everything else
//! that goes wrong is `ClientError::Other`.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{debug, warn};

use parley_contracts::error::{ClientError, ParleyError, ParleyResult};
use parley_core::traits::LanguageModelClient;

pub const DEFAULT_MODEL: &str = "models/gemini-2.0-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const QUOTA_STATUS: &str = "RESOURCE_EXHAUSTED";

/// Connection settings for `GeminiClient`.
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub model: String,
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl GeminiSettings {
    /// `{endpoint}/{model}:generateContent`, tolerating a trailing slash on
    /// the endpoint.
    pub fn url(&self) -> String {
        format!(
            "{}/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model.trim_start_matches('/')
        )
    }
}

/// Blocking HTTP client for the Gemini API.
#[derive(Debug)]
pub struct GeminiClient {
    api_key: SecretString,
    settings: GeminiSettings,
    http: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(api_key: SecretString, settings: GeminiSettings) -> ParleyResult<Self> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(ParleyError::Config {
                reason: "API key is empty".to_string(),
            });
        }

        let http = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ParleyError::Config {
                reason: format!("cannot build HTTP client: {e}"),
            })?;

        Ok(Self {
            api_key,
            settings,
            http,
        })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }
}

impl LanguageModelClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, ClientError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        debug!(
            model = %self.settings.model,
            prompt_chars = prompt.len(),
            "calling model"
        );

        let response = self
            .http
            .post(self.settings.url())
            .query(&[("key", self.api_key.expose_secret())])
            .json(&body)
            .send()
            // The URL carries the key; keep it out of error text.
            .map_err(|e| ClientError::Other {
                reason: e.without_url().to_string(),
            })?;

        let status = response.status().as_u16();
        let text = response.text().map_err(|e| ClientError::Other {
            reason: format!("cannot read response body: {}", e.without_url()),
        })?;

        if let Err(e) = classify_status(status, &text) {
            warn!(status, error = %e, "model call failed");
            return Err(e);
        }

        let completion = extract_text(&text)?;
        debug!(completion_chars = completion.len(), "model call succeeded");
        Ok(completion)
    }
}

// ── Response handling ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    status: Option<String>,
    message: Option<String>,
}

/// Map an HTTP status and body to `Ok(())` or the matching `ClientError`.
pub fn classify_status(status: u16, body: &str) -> Result<(), ClientError> {
    let error = serde_json::from_str::<ErrorEnvelope>(body).ok().map(|e| e.error);
    let message = error.as_ref().and_then(|e| e.message.clone());
    let quota = error
        .as_ref()
        .and_then(|e| e.status.as_deref())
        .is_some_and(|s| s == QUOTA_STATUS);

    if status == 429 || quota {
        return Err(ClientError::RateLimited {
            detail: message.unwrap_or_else(|| format!("HTTP {status}")),
        });
    }
    if !(200..300).contains(&status) {
        let reason = match message {
            Some(message) => format!("HTTP {status}: {message}"),
            None => format!("HTTP {status}"),
        };
        return Err(ClientError::Other { reason });
    }
    Ok(())
}

/// Concatenate the text parts of the first candidate.
pub fn extract_text(body: &str) -> Result<String, ClientError> {
    let response: GenerateResponse = serde_json::from_str(body).map_err(|e| ClientError::Other {
        reason: format!("unexpected response shape: {e}"),
    })?;

    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ClientError::Other {
            reason: "response contained no text".to_string(),
        });
    }
    Ok(text)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
