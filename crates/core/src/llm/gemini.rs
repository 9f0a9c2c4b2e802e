use crate::config::Settings;
use crate::llm::TextModel;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl GeminiClient {
    /// A missing API key does not fail construction; `generate` reports it,
    /// and the orchestrator degrades that request to a neutral verdict.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let timeout_secs = std::env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("failed to build Gemini http client")?;

        Ok(Self {
            http,
            api_key: settings.gemini_api_key.clone(),
            base_url,
            model,
        })
    }

    fn response_text(res: &GenerateContentResponse) -> String {
        let mut out = String::new();
        for candidate in &res.candidates {
            let Some(content) = &candidate.content else {
                continue;
            };
            for part in &content.parts {
                if !out.is_empty() {
                    out.push('\n');
                }
                out.push_str(&part.text);
            }
        }
        out
    }
}

#[async_trait::async_trait]
impl TextModel for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .context("GEMINI_API_KEY is not configured")?;

        let mut headers = HeaderMap::new();
        headers.insert("x-goog-api-key", HeaderValue::from_str(api_key)?);

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        );

        let req = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let res = self
            .http
            .post(url)
            .headers(headers)
            .json(&req)
            .send()
            .await
            .context("Gemini request failed")?;

        let status = res.status();
        let text = res
            .text()
            .await
            .context("failed to read Gemini response body")?;
        if !status.is_success() {
            anyhow::bail!("Gemini HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<GenerateContentResponse>(&text)
            .with_context(|| format!("failed to parse Gemini response JSON: {text}"))?;

        let out = Self::response_text(&parsed);
        // Safety blocks and empty candidates land here.
        anyhow::ensure!(!out.trim().is_empty(), "Gemini response contained no text");
        Ok(out)
    }
}

#[derive(Debug, Clone, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Clone, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Clone, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn joins_candidate_text_parts() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "{\"pulse\":"}, {"text": "\"neutral\"}"}],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        }))
        .unwrap();

        assert_eq!(
            GeminiClient::response_text(&res),
            "{\"pulse\":\n\"neutral\"}"
        );
    }

    #[test]
    fn safety_blocked_response_has_no_text() {
        let res: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "SAFETY"}],
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .unwrap();

        assert_eq!(GeminiClient::response_text(&res), "");
    }
}
