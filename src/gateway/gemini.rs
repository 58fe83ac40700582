//! Google Gemini provider.
//!
//! Request shape: `contents[].parts[].text` plus `generationConfig` and
//! content-safety thresholds. The first generated fragment lives at
//! `candidates[0].content.parts[0].text`.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::gateway::{
    build_client, classify_upstream_status, require_non_blank, GenerationParams, Provider,
};
use crate::types::{Error, Result, UpstreamConfig};

const DEFAULT_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent";

/// Safety categories blocked at medium-and-above, matching the upstream API's
/// supported set.
const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Credential deliberately excluded; log presence only.
        f.debug_struct("GeminiProvider")
            .field("url", &self.url)
            .field("has_api_key", &!self.api_key.is_empty())
            .finish()
    }
}

impl GeminiProvider {
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            api_key: config.api_key.clone(),
            url: config
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_URL.to_string()),
        })
    }

    fn request_body(prompt: &str, params: &GenerationParams) -> Value {
        json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": params.temperature,
                "topK": params.top_k,
                "topP": params.top_p,
                "maxOutputTokens": params.max_output_tokens,
                "stopSequences": [],
            },
            "safetySettings": SAFETY_CATEGORIES
                .iter()
                .map(|category| json!({
                    "category": category,
                    "threshold": "BLOCK_MEDIUM_AND_ABOVE",
                }))
                .collect::<Vec<_>>(),
        })
    }
}

#[async_trait]
impl Provider for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(prompt, params))
            .send()
            .await
            .map_err(|e| Error::connection_failure(format!("gemini request failed: {e}")))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status, "gemini upstream error");
            return Err(classify_upstream_status(status, &detail));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| Error::UnknownUpstream(format!("invalid gemini response: {e}")))?;

        let fragment = envelope
            .get("candidates")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("content"))
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.get(0))
            .and_then(|p| p.get("text"))
            .and_then(|t| t.as_str());

        require_non_blank(fragment, self.name())
    }
}
