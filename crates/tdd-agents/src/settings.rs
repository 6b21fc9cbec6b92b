//! Environment-driven defaults and credentials.
//!
//! This is the only place the process reads environment variables; the
//! orchestration crate receives everything as explicit values.

use std::path::PathBuf;

use orchestration::{OptionDefaults, ProviderCredentials};

/// Environment-variable names for provider credentials, one per provider.
const ENV_OPENAI_KEY: &str = "OPENAI_KEY";
const ENV_OPENROUTER_KEY: &str = "OPENROUTER_KEY";
const ENV_GEMINI_KEY: &str = "GEMINI_KEY";

/// Environment-variable names for option defaults.
const ENV_DEFAULT_MODEL: &str = "DEFAULT_MODEL";
const ENV_ELEVATION_MODEL: &str = "ELEVATION_MODEL";
const ENV_MODEL_TIMEOUT: &str = "MODEL_TIMEOUT";
const ENV_MAX_RETRIES: &str = "MAX_RETRIES";

/// Optional provider catalogue override file.
const ENV_PROVIDERS_FILE: &str = "TDD_PROVIDERS_FILE";

/// Option defaults, with environment overrides on top of the built-ins.
pub fn option_defaults_from_env() -> OptionDefaults {
    let mut defaults = OptionDefaults::default();
    if let Ok(model) = std::env::var(ENV_DEFAULT_MODEL) {
        defaults.model = model;
    }
    if let Ok(model) = std::env::var(ENV_ELEVATION_MODEL) {
        defaults.elevation_model = model;
    }
    if let Some(timeout) = parse_env(ENV_MODEL_TIMEOUT) {
        defaults.timeout_seconds = timeout;
    }
    if let Some(retries) = parse_env(ENV_MAX_RETRIES) {
        defaults.max_retries = retries;
    }
    defaults
}

/// Collect per-provider API keys from the environment.
pub fn credentials_from_env() -> ProviderCredentials {
    let mut credentials = ProviderCredentials::new();
    for (provider, var) in [
        ("openai", ENV_OPENAI_KEY),
        ("openrouter", ENV_OPENROUTER_KEY),
        ("gemini", ENV_GEMINI_KEY),
    ] {
        if let Ok(key) = std::env::var(var) {
            if !key.is_empty() {
                credentials.insert(provider, key);
            }
        }
    }
    credentials
}

/// Provider catalogue file configured via the environment, if any.
pub fn providers_file_from_env() -> Option<PathBuf> {
    std::env::var(ENV_PROVIDERS_FILE).ok().map(PathBuf::from)
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|raw| raw.parse().ok())
}
