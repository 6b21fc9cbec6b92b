//! Service status snapshot: uptime, configured providers, credential
//! presence. Built without touching the orchestrator or the network.

use serde::{Deserialize, Serialize};

use orchestration::{ProviderCredentials, ProviderRegistry};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderStatus {
    pub name: String,
    pub models: Vec<String>,
    /// Whether a credential for this provider is configured.
    pub credential_present: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusInfo {
    pub uptime_seconds: u64,
    pub providers: Vec<ProviderStatus>,
}

impl StatusInfo {
    pub fn collect(
        registry: &ProviderRegistry,
        credentials: &ProviderCredentials,
        uptime_seconds: u64,
    ) -> Self {
        let providers = registry
            .providers
            .iter()
            .map(|p| ProviderStatus {
                name: p.name.clone(),
                models: p.models.iter().map(|m| m.name.clone()).collect(),
                credential_present: credentials.has(&p.name),
            })
            .collect();
        Self {
            uptime_seconds,
            providers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reports_providers_and_credentials() {
        let registry = ProviderRegistry::builtin();
        let mut credentials = ProviderCredentials::new();
        credentials.insert("openai", "sk-test");

        let status = StatusInfo::collect(&registry, &credentials, 42);
        assert_eq!(status.uptime_seconds, 42);
        assert_eq!(status.providers.len(), 3);

        let openai = status.providers.iter().find(|p| p.name == "openai").unwrap();
        assert!(openai.credential_present);
        assert!(openai.models.contains(&"gpt-3.5-turbo".to_string()));

        let gemini = status.providers.iter().find(|p| p.name == "gemini").unwrap();
        assert!(!gemini.credential_present);
    }
}
