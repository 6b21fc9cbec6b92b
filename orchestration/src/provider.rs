//! The pluggable provider-call seam.
//!
//! The engine only needs one capability from the outside world: send a
//! prompt to `(provider, model)` and get raw text back. Everything else
//! (HTTP, auth, request bodies) lives behind [`ProviderClient`], so tests
//! drive the engine with deterministic stubs.

use anyhow::Result;
use async_trait::async_trait;

/// One completion call, fully resolved by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Provider that declares `model`.
    pub provider: String,
    pub model: String,
    pub prompt: String,
    /// System preamble steering the output shape.
    pub system_prompt: Option<String>,
    pub temperature: f64,
    pub max_tokens: u32,
    /// Per-request key override; implementations fall back to their own
    /// configured credentials when absent.
    pub api_key: Option<String>,
}

/// Raw text returned by a provider, before shape validation.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    /// Model the provider reports having served the call.
    pub model: String,
}

/// Abstract capability to call a provider+model with a prompt.
///
/// The engine applies the per-attempt timeout around this call; an
/// implementation does not need its own deadline handling.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;
}

#[async_trait]
impl<T: ProviderClient + ?Sized> ProviderClient for Box<T> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        (**self).complete(request).await
    }
}

#[async_trait]
impl<T: ProviderClient + ?Sized> ProviderClient for std::sync::Arc<T> {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        (**self).complete(request).await
    }
}
