//! DeepSeek provider.
//!
//! OpenAI-style chat completions: bearer credential, `messages` array, first
//! fragment at `choices[0].message.content`. DeepSeek has no topK or safety
//! threshold knobs, so only the parameters it supports are forwarded.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::gateway::{
    build_client, classify_upstream_status, require_non_blank, GenerationParams, Provider,
};
use crate::types::{Error, Result, UpstreamConfig};

const DEFAULT_URL: &str = "https://api.deepseek.com/chat/completions";
const MODEL: &str = "deepseek-chat";

pub struct DeepSeekProvider {
    client: reqwest::Client,
    api_key: String,
    url: String,
}

impl std::fmt::Debug for DeepSeekProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeepSeekProvider")
            .field("url", &self.url)
            .field("has_api_key", &!self.api_key.is_empty())
            .finish()
    }
}

impl DeepSeekProvider {
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
            "model": MODEL,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": params.temperature,
            "top_p": params.top_p,
            "max_tokens": params.max_output_tokens,
            "stream": false,
        })
    }
}

#[async_trait]
impl Provider for DeepSeekProvider {
    fn name(&self) -> &'static str {
        "deepseek"
    }

    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&Self::request_body(prompt, params))
            .send()
            .await
            .map_err(|e| Error::connection_failure(format!("deepseek request failed: {e}")))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let detail = response.text().await.unwrap_or_default();
            tracing::warn!(status, "deepseek upstream error");
            return Err(classify_upstream_status(status, &detail));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| Error::UnknownUpstream(format!("invalid deepseek response: {e}")))?;

        let fragment = envelope
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .and_then(|m| m.get("content"))
            .and_then(|t| t.as_str());

        require_non_blank(fragment, self.name())
    }
}
