//! The orchestration engine: model selection, retry, and elevation.
//!
//! One call to [`AgentOrchestrator::generate_feature`] walks an attempt
//! chain built from the request options and the provider catalogue:
//!
//! ```text
//! primary model
//!   ├─ up to max_retries + 1 attempts, exponential backoff between them
//!   ├─ success → FeatureResult
//!   └─ exhausted → elevate to the next chain entry
//! elevation model, then the catalogue's fallback chain
//!   └─ chain exhausted → ChainExhausted { attempts }
//! ```
//!
//! Retrying the same model absorbs transient failures (rate limits, flaky
//! network); elevation handles systematic ones (model cannot produce the
//! required structure). Retry budgets are per chain entry and never shared
//! across entries.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::OrchestrationError;
use crate::feature::FeatureResult;
use crate::options::FeatureOptions;
use crate::prompts;
use crate::provider::{CompletionRequest, ProviderClient};
use crate::registry::ProviderRegistry;
use crate::retry::RetryPolicy;
use crate::telemetry::{AttemptOutcome, AttemptRecord};

/// One resolved entry of the attempt chain.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChainEntry {
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
}

/// Drives model selection, elevation, retry, and timeout policy.
pub struct AgentOrchestrator {
    registry: Arc<ProviderRegistry>,
    client: Arc<dyn ProviderClient>,
    retry: RetryPolicy,
}

impl AgentOrchestrator {
    pub fn new(registry: Arc<ProviderRegistry>, client: Arc<dyn ProviderClient>) -> Self {
        Self {
            registry,
            client,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Generate a TDD artifact for `prompt`, walking the fallback chain
    /// until a shape-valid response arrives or the chain is exhausted.
    pub async fn generate_feature(
        &self,
        prompt: &str,
        options: &FeatureOptions,
    ) -> Result<FeatureResult, OrchestrationError> {
        options.validate()?;
        let chain = self.build_chain(options)?;
        debug!(
            primary = %options.model,
            chain_len = chain.len(),
            force = options.force,
            "attempt chain built"
        );

        let mut attempts: Vec<AttemptRecord> = Vec::new();

        for (position, entry) in chain.iter().enumerate() {
            if position > 0 {
                info!(
                    from = %chain[position - 1].model,
                    to = %entry.model,
                    "elevating to next chain entry"
                );
            }

            for attempt in 0..=options.max_retries {
                if attempt > 0 {
                    tokio::time::sleep(self.retry.delay_for(attempt - 1)).await;
                }

                match self.attempt(prompt, options, entry, &mut attempts).await {
                    Ok(result) => return Ok(result),
                    Err(error) if error.is_retriable() => continue,
                    Err(error) => return Err(error),
                }
            }
        }

        Err(OrchestrationError::ChainExhausted { attempts })
    }

    /// Issue one provider call; records the attempt either way. Failures come
    /// back as classified [`OrchestrationError`]s for the retry loop.
    async fn attempt(
        &self,
        prompt: &str,
        options: &FeatureOptions,
        entry: &ChainEntry,
        attempts: &mut Vec<AttemptRecord>,
    ) -> Result<FeatureResult, OrchestrationError> {
        let request = CompletionRequest {
            provider: entry.provider.clone(),
            model: entry.model.clone(),
            prompt: prompt.to_string(),
            system_prompt: Some(prompts::FEATURE_PREAMBLE.to_string()),
            temperature: options.temperature,
            max_tokens: entry.max_tokens,
            api_key: options.api_key.clone(),
        };

        let started_at = Utc::now();
        let clock = Instant::now();
        let deadline = Duration::from_secs(options.timeout_seconds);

        let result = match tokio::time::timeout(deadline, self.client.complete(request)).await {
            Err(_elapsed) => Err(OrchestrationError::ProviderTimeout {
                model: entry.model.clone(),
                timeout_seconds: options.timeout_seconds,
            }),
            Ok(Err(e)) => Err(OrchestrationError::ProviderResponse {
                model: entry.model.clone(),
                message: e.to_string(),
            }),
            Ok(Ok(response)) => FeatureResult::parse(&response.content).map_err(|reason| {
                OrchestrationError::InvalidResponse {
                    model: entry.model.clone(),
                    message: reason,
                }
            }),
        };

        let (outcome, detail) = match &result {
            Ok(_) => (AttemptOutcome::Ok, None),
            Err(error) => (
                AttemptOutcome::from_failure(error.retry_category()),
                Some(error.to_string()),
            ),
        };

        let record = AttemptRecord {
            provider: entry.provider.clone(),
            model: entry.model.clone(),
            started_at,
            outcome,
            latency_ms: clock.elapsed().as_millis() as u64,
            detail,
        };
        record.log();
        attempts.push(record);

        result
    }

    /// Build the attempt chain: primary, then (unless `force`) the elevation
    /// model and the catalogue's fallback chain, deduplicated in order.
    fn build_chain(&self, options: &FeatureOptions) -> Result<Vec<ChainEntry>, OrchestrationError> {
        let mut chain: Vec<ChainEntry> = Vec::new();
        let mut push = |registry: &ProviderRegistry,
                        chain: &mut Vec<ChainEntry>,
                        model_name: &str|
         -> Result<(), OrchestrationError> {
            if chain.iter().any(|e| e.model == model_name) {
                return Ok(());
            }
            let (provider, model) = registry.resolve(model_name)?;
            chain.push(ChainEntry {
                provider: provider.name.clone(),
                model: model.name.clone(),
                max_tokens: options.max_tokens.unwrap_or(model.max_tokens),
            });
            Ok(())
        };

        // The primary must resolve; an unknown model with no resolvable
        // fallback is an options error, caught before any provider call.
        push(&self.registry, &mut chain, &options.model).map_err(|e| match e {
            OrchestrationError::UnknownModel(name) => OrchestrationError::InvalidOptions(format!(
                "model '{name}' is not declared by any configured provider"
            )),
            other => other,
        })?;

        if options.force {
            return Ok(chain);
        }

        push(&self.registry, &mut chain, &options.elevation_model).map_err(|e| match e {
            OrchestrationError::UnknownModel(name) => OrchestrationError::InvalidOptions(format!(
                "elevation model '{name}' is not declared by any configured provider"
            )),
            other => other,
        })?;
        for name in self.registry.fallback_chain_for(&options.model)? {
            push(&self.registry, &mut chain, &name)?;
        }
        Ok(chain)
    }
}
