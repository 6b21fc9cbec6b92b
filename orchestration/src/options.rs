//! Per-request feature generation options.
//!
//! `FeatureOptions` is immutable once constructed and created per request.
//! Validation happens before any provider call; out-of-range values are
//! rejected with `OrchestrationError::InvalidOptions`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OrchestrationError;

/// Output rendering requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Markdown,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "markdown" => Ok(Self::Markdown),
            other => Err(format!("unknown output format '{other}'")),
        }
    }
}

/// Defaults applied when a caller omits an option.
///
/// Constructed by the CLI layer (which may consult the environment); the
/// orchestration crate itself never reads environment variables.
#[derive(Debug, Clone)]
pub struct OptionDefaults {
    pub model: String,
    pub elevation_model: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub temperature: f64,
}

impl Default for OptionDefaults {
    fn default() -> Self {
        Self {
            model: "gpt-3.5-turbo".to_string(),
            elevation_model: "gpt-4-turbo".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            temperature: 0.7,
        }
    }
}

/// Options for one feature generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureOptions {
    /// Primary model to try first.
    pub model: String,
    /// Stronger model to elevate to after the primary exhausts its retries.
    pub elevation_model: String,
    /// When true, the attempt chain is exactly the primary model.
    pub force: bool,
    /// Per-request API key override; falls back to provider credentials.
    pub api_key: Option<String>,
    /// Per-attempt deadline in seconds. Must be > 0.
    pub timeout_seconds: u64,
    /// Extra attempts per chain entry after the first.
    pub max_retries: u32,
    /// Sampling temperature. Must be within [0, 2].
    pub temperature: f64,
    /// Completion budget override; provider default when absent. Must be > 0.
    pub max_tokens: Option<u32>,
    /// Requested rendering of the result.
    pub output_format: OutputFormat,
}

impl FeatureOptions {
    /// Build options from defaults, leaving per-request fields overridable.
    pub fn from_defaults(defaults: &OptionDefaults) -> Self {
        Self {
            model: defaults.model.clone(),
            elevation_model: defaults.elevation_model.clone(),
            force: false,
            api_key: None,
            timeout_seconds: defaults.timeout_seconds,
            max_retries: defaults.max_retries,
            temperature: defaults.temperature,
            max_tokens: None,
            output_format: OutputFormat::Json,
        }
    }

    /// Build options from a loose `metadata.options` map (MCP inbound shape).
    ///
    /// Missing fields take defaults; present fields must have the right type
    /// and pass [`FeatureOptions::validate`].
    pub fn from_metadata(
        options: &serde_json::Map<String, Value>,
        defaults: &OptionDefaults,
    ) -> Result<Self, OrchestrationError> {
        let mut built = Self::from_defaults(defaults);

        if let Some(v) = options.get("model") {
            built.model = expect_string(v, "model")?;
        }
        if let Some(v) = options.get("elevation_model") {
            built.elevation_model = expect_string(v, "elevation_model")?;
        }
        if let Some(v) = options.get("force") {
            built.force = v
                .as_bool()
                .ok_or_else(|| invalid("force", "a boolean", v))?;
        }
        if let Some(v) = options.get("api_key") {
            built.api_key = Some(expect_string(v, "api_key")?);
        }
        if let Some(v) = options.get("timeout_seconds") {
            built.timeout_seconds = v
                .as_u64()
                .ok_or_else(|| invalid("timeout_seconds", "a positive integer", v))?;
        }
        if let Some(v) = options.get("max_retries") {
            let n = v
                .as_u64()
                .ok_or_else(|| invalid("max_retries", "a non-negative integer", v))?;
            built.max_retries = u32::try_from(n)
                .map_err(|_| invalid("max_retries", "a non-negative integer", v))?;
        }
        if let Some(v) = options.get("temperature") {
            built.temperature = v
                .as_f64()
                .ok_or_else(|| invalid("temperature", "a number", v))?;
        }
        if let Some(v) = options.get("max_tokens") {
            let n = v
                .as_u64()
                .ok_or_else(|| invalid("max_tokens", "a positive integer", v))?;
            built.max_tokens =
                Some(u32::try_from(n).map_err(|_| invalid("max_tokens", "a positive integer", v))?);
        }
        if let Some(v) = options.get("output_format") {
            let s = expect_string(v, "output_format")?;
            built.output_format = s
                .parse()
                .map_err(OrchestrationError::InvalidOptions)?;
        }

        built.validate()?;
        Ok(built)
    }

    /// Reject out-of-range values before any provider call is made.
    pub fn validate(&self) -> Result<(), OrchestrationError> {
        if self.model.trim().is_empty() {
            return Err(OrchestrationError::InvalidOptions(
                "model must not be empty".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(OrchestrationError::InvalidOptions(
                "timeout_seconds must be > 0".to_string(),
            ));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(OrchestrationError::InvalidOptions(format!(
                "temperature must be in [0, 2], got {}",
                self.temperature
            )));
        }
        if let Some(max_tokens) = self.max_tokens {
            if max_tokens == 0 {
                return Err(OrchestrationError::InvalidOptions(
                    "max_tokens must be > 0".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn expect_string(value: &Value, field: &str) -> Result<String, OrchestrationError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(field, "a string", value))
}

fn invalid(field: &str, expected: &str, got: &Value) -> OrchestrationError {
    OrchestrationError::InvalidOptions(format!("{field} must be {expected}, got {got}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> FeatureOptions {
        FeatureOptions::from_defaults(&OptionDefaults::default())
    }

    #[test]
    fn defaults_validate() {
        base().validate().expect("defaults should be valid");
    }

    #[test]
    fn temperature_boundaries() {
        let mut opts = base();
        opts.temperature = 0.0;
        assert!(opts.validate().is_ok());
        opts.temperature = 2.0;
        assert!(opts.validate().is_ok());
        opts.temperature = 2.1;
        assert!(matches!(
            opts.validate(),
            Err(OrchestrationError::InvalidOptions(_))
        ));
    }

    #[test]
    fn zero_timeout_rejected() {
        let mut opts = base();
        opts.timeout_seconds = 0;
        assert!(opts.validate().is_err());
    }

    #[test]
    fn zero_max_tokens_rejected() {
        let mut opts = base();
        opts.max_tokens = Some(0);
        assert!(opts.validate().is_err());
    }

    #[test]
    fn from_metadata_applies_overrides() {
        let raw = serde_json::json!({
            "model": "gpt-4",
            "force": true,
            "temperature": 0.2,
            "max_retries": 1,
            "output_format": "markdown"
        });
        let opts =
            FeatureOptions::from_metadata(raw.as_object().unwrap(), &OptionDefaults::default())
                .unwrap();
        assert_eq!(opts.model, "gpt-4");
        assert!(opts.force);
        assert_eq!(opts.max_retries, 1);
        assert_eq!(opts.output_format, OutputFormat::Markdown);
        // untouched fields keep defaults
        assert_eq!(opts.timeout_seconds, 30);
        assert_eq!(opts.elevation_model, "gpt-4-turbo");
    }

    #[test]
    fn from_metadata_rejects_wrong_types() {
        let raw = serde_json::json!({ "timeout_seconds": "thirty" });
        let err =
            FeatureOptions::from_metadata(raw.as_object().unwrap(), &OptionDefaults::default())
                .unwrap_err();
        assert!(matches!(err, OrchestrationError::InvalidOptions(_)));
    }

    #[test]
    fn from_metadata_rejects_out_of_range_temperature() {
        let raw = serde_json::json!({ "temperature": 2.1 });
        assert!(
            FeatureOptions::from_metadata(raw.as_object().unwrap(), &OptionDefaults::default())
                .is_err()
        );
    }
}
