//! Generative-text backend
//!
//! The assistant routes depend only on this one-method trait; the concrete
//! Gemini adapter is the single place that knows the provider's wire format.

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Empty response from text backend")]
    EmptyResponse,
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

const GEMINI_ENDPOINT: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";

/// Gemini-backed text generator.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(http: reqwest::Client, api_key: String) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let body = json!({
            "contents": [{
                "parts": [{ "text": prompt }]
            }]
        });

        let response: serde_json::Value = self
            .http
            .post(GEMINI_ENDPOINT)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let text = response["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .ok_or(GenerateError::EmptyResponse)?;

        if text.is_empty() {
            return Err(GenerateError::EmptyResponse);
        }

        Ok(text.to_string())
    }
}

/// Strip markdown code fences a model may wrap structured output in.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fenced_json() {
        let fenced = "```json\n[{\"a\": 1}]\n```";
        assert_eq!(strip_code_fences(fenced), "[{\"a\": 1}]");
    }

    #[test]
    fn test_strip_plain_fences() {
        assert_eq!(strip_code_fences("```\nhello\n```"), "hello");
    }

    #[test]
    fn test_unfenced_text_unchanged() {
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }
}
