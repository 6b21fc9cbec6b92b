//! Provider catalogue: providers, their models, and fallback orders.
//!
//! Loaded once at process start and read-only for the engine's lifetime.
//! The registry answers two questions: which provider declares a model
//! (`resolve`) and what comes after a model when its retries are exhausted
//! (`fallback_chain_for`).

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::OrchestrationError;

/// Wire/API dialect a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// OpenAI chat completions.
    OpenAi,
    /// OpenRouter (OpenAI-compatible chat completions).
    OpenRouter,
    /// Google Gemini generateContent.
    Gemini,
}

/// Provider-declared defaults for one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

/// One provider with its ordered model list and local fallback order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: String,
    pub models: Vec<ModelConfig>,
    /// Order in which this provider's models are tried during fallback.
    pub fallback_order: Vec<String>,
}

impl ProviderConfig {
    pub fn model(&self, name: &str) -> Option<&ModelConfig> {
        self.models.iter().find(|m| m.name == name)
    }
}

/// Static catalogue of providers plus the global provider fallback order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRegistry {
    pub providers: Vec<ProviderConfig>,
    /// Order in which providers are consulted once a model's own provider
    /// is exhausted.
    pub provider_fallback_order: Vec<String>,
}

impl ProviderRegistry {
    /// Built-in catalogue: openai, openrouter, and gemini with their
    /// documented model lists.
    pub fn builtin() -> Self {
        let openai = ProviderConfig {
            name: "openai".to_string(),
            kind: ProviderKind::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            models: vec![
                model("gpt-4-turbo", 4_000, 0.7),
                model("gpt-4", 4_000, 0.7),
                model("gpt-3.5-turbo", 4_000, 0.7),
            ],
            fallback_order: names(&["gpt-4-turbo", "gpt-4", "gpt-3.5-turbo"]),
        };
        let openrouter = ProviderConfig {
            name: "openrouter".to_string(),
            kind: ProviderKind::OpenRouter,
            base_url: "https://openrouter.ai/api/v1".to_string(),
            models: vec![
                model("openrouter/auto", 4_000, 0.7),
                model("anthropic/claude-3-opus", 4_000, 0.7),
                model("anthropic/claude-3-sonnet", 4_000, 0.7),
            ],
            fallback_order: names(&[
                "openrouter/auto",
                "anthropic/claude-3-opus",
                "anthropic/claude-3-sonnet",
            ]),
        };
        let gemini = ProviderConfig {
            name: "gemini".to_string(),
            kind: ProviderKind::Gemini,
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            models: vec![
                model("gemini-pro", 4_000, 0.7),
                model("gemini-pro-vision", 4_000, 0.7),
            ],
            fallback_order: names(&["gemini-pro", "gemini-pro-vision"]),
        };

        Self {
            providers: vec![openai, openrouter, gemini],
            provider_fallback_order: names(&["openai", "openrouter", "gemini"]),
        }
    }

    /// Load a registry from a TOML file, validating internal references.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read provider catalogue {}", path.display()))?;
        let registry: Self = toml::from_str(&raw)
            .with_context(|| format!("invalid provider catalogue {}", path.display()))?;
        registry.check().map_err(anyhow::Error::msg)?;
        Ok(registry)
    }

    /// Internal consistency: every fallback entry must name a declared
    /// model/provider.
    fn check(&self) -> Result<(), String> {
        if self.providers.is_empty() {
            return Err("catalogue declares no providers".to_string());
        }
        for provider in &self.providers {
            for name in &provider.fallback_order {
                if provider.model(name).is_none() {
                    return Err(format!(
                        "provider '{}' lists unknown model '{}' in fallback_order",
                        provider.name, name
                    ));
                }
            }
        }
        for name in &self.provider_fallback_order {
            if self.provider(name).is_none() {
                return Err(format!(
                    "provider_fallback_order lists unknown provider '{name}'"
                ));
            }
        }
        Ok(())
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderConfig> {
        self.providers.iter().find(|p| p.name == name)
    }

    /// Find the provider that declares `model_name`.
    pub fn resolve(
        &self,
        model_name: &str,
    ) -> Result<(&ProviderConfig, &ModelConfig), OrchestrationError> {
        self.providers
            .iter()
            .find_map(|p| p.model(model_name).map(|m| (p, m)))
            .ok_or_else(|| OrchestrationError::UnknownModel(model_name.to_string()))
    }

    /// Ordered model names to try after `model_name` is exhausted.
    ///
    /// Walks the model's own provider's `fallback_order` starting after the
    /// given model, then appends the remaining providers' fallback orders in
    /// global provider order. The given model itself never appears.
    pub fn fallback_chain_for(&self, model_name: &str) -> Result<Vec<String>, OrchestrationError> {
        let (home, _) = self.resolve(model_name)?;
        let mut chain: Vec<String> = Vec::new();

        let start = home
            .fallback_order
            .iter()
            .position(|m| m == model_name)
            .map(|i| i + 1)
            .unwrap_or(0);
        for name in home.fallback_order.iter().skip(start) {
            if name != model_name && !chain.contains(name) {
                chain.push(name.clone());
            }
        }

        for provider_name in &self.provider_fallback_order {
            if *provider_name == home.name {
                continue;
            }
            if let Some(provider) = self.provider(provider_name) {
                for name in &provider.fallback_order {
                    if name != model_name && !chain.contains(name) {
                        chain.push(name.clone());
                    }
                }
            }
        }

        Ok(chain)
    }

    /// All declared model names, in provider order.
    pub fn model_names(&self) -> Vec<String> {
        self.providers
            .iter()
            .flat_map(|p| p.models.iter().map(|m| m.name.clone()))
            .collect()
    }
}

fn model(name: &str, max_tokens: u32, temperature: f64) -> ModelConfig {
    ModelConfig {
        name: name.to_string(),
        max_tokens,
        temperature,
    }
}

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn resolve_known_model() {
        let registry = ProviderRegistry::builtin();
        let (provider, model) = registry.resolve("gpt-4").unwrap();
        assert_eq!(provider.name, "openai");
        assert_eq!(model.name, "gpt-4");
    }

    #[test]
    fn resolve_unknown_model_fails() {
        let registry = ProviderRegistry::builtin();
        assert!(matches!(
            registry.resolve("no-such-model"),
            Err(OrchestrationError::UnknownModel(_))
        ));
    }

    #[test]
    fn fallback_chain_walks_provider_then_global_order() {
        let registry = ProviderRegistry::builtin();
        let chain = registry.fallback_chain_for("gpt-4-turbo").unwrap();
        assert_eq!(
            chain,
            vec![
                "gpt-4",
                "gpt-3.5-turbo",
                "openrouter/auto",
                "anthropic/claude-3-opus",
                "anthropic/claude-3-sonnet",
                "gemini-pro",
                "gemini-pro-vision",
            ]
        );
    }

    #[test]
    fn fallback_chain_for_last_model_skips_to_next_provider() {
        let registry = ProviderRegistry::builtin();
        let chain = registry.fallback_chain_for("gpt-3.5-turbo").unwrap();
        assert_eq!(chain[0], "openrouter/auto");
        assert!(!chain.contains(&"gpt-3.5-turbo".to_string()));
    }

    #[test]
    fn loads_catalogue_from_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
provider_fallback_order = ["local"]

[[providers]]
name = "local"
kind = "openai"
base_url = "http://localhost:8080/v1"
fallback_order = ["tiny"]

[[providers.models]]
name = "tiny"
max_tokens = 1024
temperature = 0.5
"#
        )
        .unwrap();

        let registry = ProviderRegistry::load(file.path()).unwrap();
        assert_eq!(registry.providers.len(), 1);
        let (provider, model) = registry.resolve("tiny").unwrap();
        assert_eq!(provider.kind, ProviderKind::OpenAi);
        assert_eq!(model.max_tokens, 1024);
    }

    #[test]
    fn rejects_catalogue_with_dangling_fallback_entry() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
provider_fallback_order = ["local"]

[[providers]]
name = "local"
kind = "openai"
base_url = "http://localhost:8080/v1"
fallback_order = ["missing-model"]
models = []
"#
        )
        .unwrap();

        assert!(ProviderRegistry::load(file.path()).is_err());
    }
}
