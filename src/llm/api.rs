//! `ApiTransform` — [`TextTransform`] backed by an OpenAI-compatible API.
//!
//! Calls any `/v1/chat/completions` endpoint — Ollama (OpenAI mode), OpenAI,
//! Groq, LM Studio, vLLM, etc.  All connection details come from
//! [`LlmConfig`]; nothing is hardcoded.

use async_trait::async_trait;

use crate::config::LlmConfig;
use crate::llm::prompt::PromptBuilder;
use crate::llm::transform::{LlmError, TextTransform};

// ---------------------------------------------------------------------------
// ApiTransform
// ---------------------------------------------------------------------------

/// Calls an OpenAI-compatible `/v1/chat/completions` endpoint for all three
/// pipeline transforms (correct / seed / extend).
///
/// # No hardcoded URLs
/// All connection details (`base_url`, `api_key`, `model`) come exclusively
/// from the [`LlmConfig`] passed to [`ApiTransform::from_config`].
pub struct ApiTransform {
    client: reqwest::Client,
    config: LlmConfig,
    prompt_builder: PromptBuilder,
}

impl ApiTransform {
    /// Build an `ApiTransform` from application config.
    ///
    /// The HTTP client is pre-configured with the per-request timeout from
    /// `config.timeout_secs`.  A default (no-timeout) client is used as a
    /// last-resort fallback if the builder fails (should never happen in
    /// practice).
    pub fn from_config(config: &LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let prompt_builder = PromptBuilder::new(&config.language);

        Self {
            client,
            config: config.clone(),
            prompt_builder,
        }
    }

    /// Send one chat-completion request and extract the reply text.
    ///
    /// The `Authorization: Bearer …` header is attached **only** when
    /// `config.api_key` is `Some(key)` and `key` is non-empty — safe for
    /// Ollama and other local providers that require no authentication.
    async fn chat(&self, system_msg: &str, user_msg: &str) -> Result<String, LlmError> {
        let url = format!("{}/v1/chat/completions", self.config.base_url);

        let body = serde_json::json!({
            "model":       self.config.model,
            "messages": [
                { "role": "system", "content": system_msg },
                { "role": "user",   "content": user_msg   }
            ],
            "stream":      false,
            "temperature": self.config.temperature
        });

        let mut req = self.client.post(&url).json(&body);

        let key = self.config.api_key.as_deref().unwrap_or("");
        if !key.is_empty() {
            req = req.bearer_auth(key);
        }

        let response = req.send().await?;

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::EmptyResponse)?
            .trim()
            .to_string();

        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        Ok(content)
    }
}

#[async_trait]
impl TextTransform for ApiTransform {
    async fn correct(&self, raw: &str) -> Result<String, LlmError> {
        log::debug!("sending fragment for correction ({} chars)", raw.len());
        let (system_msg, user_msg) = self.prompt_builder.correction_chat(raw);
        self.chat(&system_msg, &user_msg).await
    }

    async fn seed(&self, text: &str) -> Result<String, LlmError> {
        log::debug!("sending first fragment for structuring ({} chars)", text.len());
        let (system_msg, user_msg) = self.prompt_builder.seed_chat(text);
        self.chat(&system_msg, &user_msg).await
    }

    async fn extend(&self, context: &str, text: &str) -> Result<String, LlmError> {
        log::debug!(
            "sending fragment for continuation ({} chars, {} chars context)",
            text.len(),
            context.len()
        );
        let (system_msg, user_msg) = self.prompt_builder.extend_chat(context, text);
        self.chat(&system_msg, &user_msg).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    fn make_config(api_key: Option<&str>) -> LlmConfig {
        LlmConfig {
            base_url: "http://localhost:11434".into(),
            api_key: api_key.map(|s| s.to_string()),
            model: "qwen2.5:3b".into(),
            temperature: 0.3,
            timeout_secs: 10,
            language: "es".into(),
        }
    }

    #[test]
    fn from_config_builds_without_panic() {
        let config = make_config(None);
        let _transform = ApiTransform::from_config(&config);
    }

    #[test]
    fn from_config_accepts_empty_api_key() {
        let config = make_config(Some(""));
        let _transform = ApiTransform::from_config(&config);
    }

    /// Verify that `ApiTransform` is object-safe (usable as `dyn TextTransform`).
    #[test]
    fn transform_is_object_safe() {
        let config = make_config(Some("sk-test-1234"));
        let transform: Box<dyn TextTransform> = Box::new(ApiTransform::from_config(&config));
        drop(transform);
    }
}
