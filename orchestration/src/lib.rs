//! Provider-fallback orchestration engine for TDD feature generation.
//!
//! Turns a natural-language feature description into a structured TDD
//! artifact by delegating to an LLM provider, with model selection,
//! elevation on failure, retry with backoff, and per-attempt timeouts.
//!
//! The one pluggable seam is [`provider::ProviderClient`]; everything else
//! is deterministic and driven by the read-only [`registry::ProviderRegistry`]
//! plus per-request [`options::FeatureOptions`].

pub mod engine;
pub mod error;
pub mod feature;
pub mod http;
pub mod options;
pub mod prompts;
pub mod provider;
pub mod registry;
pub mod retry;
pub mod telemetry;

pub use engine::AgentOrchestrator;
pub use error::{OrchestrationError, RetryCategory};
pub use feature::{FeatureResult, Scenario};
pub use http::{HttpProviderClient, ProviderCredentials};
pub use options::{FeatureOptions, OptionDefaults, OutputFormat};
pub use provider::{CompletionRequest, CompletionResponse, ProviderClient};
pub use registry::{ModelConfig, ProviderConfig, ProviderKind, ProviderRegistry};
pub use retry::RetryPolicy;
pub use telemetry::{AttemptOutcome, AttemptRecord};
