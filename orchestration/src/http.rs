//! HTTP implementation of [`ProviderClient`].
//!
//! Speaks OpenAI-compatible chat completions for openai/openrouter and the
//! Gemini generateContent API. Credentials are handed in at construction;
//! this crate never reads environment variables.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::provider::{CompletionRequest, CompletionResponse, ProviderClient};
use crate::registry::{ProviderKind, ProviderRegistry};

/// Per-provider API keys, collected by the caller (CLI layer).
#[derive(Debug, Clone, Default)]
pub struct ProviderCredentials {
    keys: HashMap<String, String>,
}

impl ProviderCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, provider: impl Into<String>, key: impl Into<String>) {
        self.keys.insert(provider.into(), key.into());
    }

    pub fn get(&self, provider: &str) -> Option<&str> {
        self.keys.get(provider).map(String::as_str)
    }

    /// Whether a credential is configured for `provider`.
    pub fn has(&self, provider: &str) -> bool {
        self.keys.contains_key(provider)
    }
}

/// reqwest-backed provider client.
pub struct HttpProviderClient {
    http: reqwest::Client,
    registry: Arc<ProviderRegistry>,
    credentials: ProviderCredentials,
}

impl HttpProviderClient {
    pub fn new(registry: Arc<ProviderRegistry>, credentials: ProviderCredentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            registry,
            credentials,
        }
    }

    fn api_key<'a>(&'a self, request: &'a CompletionRequest) -> Result<&'a str> {
        request
            .api_key
            .as_deref()
            .or_else(|| self.credentials.get(&request.provider))
            .ok_or_else(|| anyhow!("no API key configured for provider '{}'", request.provider))
    }

    async fn complete_chat(&self, base_url: &str, request: &CompletionRequest) -> Result<String> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system_prompt {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.push(json!({ "role": "user", "content": request.prompt }));

        let body = json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });

        let response = self
            .http
            .post(format!("{base_url}/chat/completions"))
            .bearer_auth(self.api_key(request)?)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("request to {} failed", request.provider))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!(
                "{} returned {}: {}",
                request.provider,
                status,
                text
            ));
        }

        let payload: Value = response.json().await.context("non-JSON provider reply")?;
        payload
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("{} reply missing message content", request.provider))
    }

    async fn complete_gemini(&self, base_url: &str, request: &CompletionRequest) -> Result<String> {
        let mut parts = Vec::new();
        if let Some(system) = &request.system_prompt {
            parts.push(json!({ "text": system }));
        }
        parts.push(json!({ "text": request.prompt }));

        let body = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": {
                "temperature": request.temperature,
                "maxOutputTokens": request.max_tokens,
            },
        });

        let url = format!(
            "{base_url}/models/{}:generateContent?key={}",
            request.model,
            self.api_key(request)?
        );
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .context("request to gemini failed")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(anyhow!("gemini returned {}: {}", status, text));
        }

        let payload: Value = response.json().await.context("non-JSON gemini reply")?;
        payload
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| anyhow!("gemini reply missing candidate text"))
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let provider = self
            .registry
            .provider(&request.provider)
            .ok_or_else(|| anyhow!("provider '{}' not in catalogue", request.provider))?;

        let content = match provider.kind {
            ProviderKind::OpenAi | ProviderKind::OpenRouter => {
                self.complete_chat(&provider.base_url, &request).await?
            }
            ProviderKind::Gemini => self.complete_gemini(&provider.base_url, &request).await?,
        };

        Ok(CompletionResponse {
            content,
            model: request.model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_lookup() {
        let mut creds = ProviderCredentials::new();
        creds.insert("openai", "sk-test");
        assert!(creds.has("openai"));
        assert!(!creds.has("gemini"));
        assert_eq!(creds.get("openai"), Some("sk-test"));
    }

    #[test]
    fn request_key_overrides_configured_key() {
        let mut creds = ProviderCredentials::new();
        creds.insert("openai", "sk-configured");
        let client = HttpProviderClient::new(Arc::new(ProviderRegistry::builtin()), creds);

        let request = CompletionRequest {
            provider: "openai".into(),
            model: "gpt-4".into(),
            prompt: "p".into(),
            system_prompt: None,
            temperature: 0.7,
            max_tokens: 100,
            api_key: Some("sk-override".into()),
        };
        assert_eq!(client.api_key(&request).unwrap(), "sk-override");

        let without_override = CompletionRequest {
            api_key: None,
            ..request
        };
        assert_eq!(client.api_key(&without_override).unwrap(), "sk-configured");
    }

    #[test]
    fn missing_key_is_an_error() {
        let client = HttpProviderClient::new(
            Arc::new(ProviderRegistry::builtin()),
            ProviderCredentials::new(),
        );
        let request = CompletionRequest {
            provider: "gemini".into(),
            model: "gemini-pro".into(),
            prompt: "p".into(),
            system_prompt: None,
            temperature: 0.7,
            max_tokens: 100,
            api_key: None,
        };
        assert!(client.api_key(&request).is_err());
    }
}
