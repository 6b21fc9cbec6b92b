//! Per-attempt telemetry records.
//!
//! One [`AttemptRecord`] is produced for every provider call the engine
//! makes. Records live only for the duration of one orchestration: they are
//! emitted as structured tracing events and carried inside
//! `OrchestrationError::ChainExhausted` so callers can see what was tried.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::RetryCategory;

/// Outcome of a single provider call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    /// Shape-valid response received.
    Ok,
    /// The call exceeded its per-attempt deadline.
    Timeout,
    /// The provider call failed (network, HTTP error, rate limit).
    ProviderError,
    /// The provider returned but the response failed shape validation.
    ParseFailure,
}

impl AttemptOutcome {
    /// Outcome recorded for a failed attempt, from its retry classification.
    pub fn from_failure(category: RetryCategory) -> Self {
        match category {
            RetryCategory::Timeout => Self::Timeout,
            RetryCategory::ParseFailure => Self::ParseFailure,
            RetryCategory::Transient | RetryCategory::Fatal => Self::ProviderError,
        }
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Timeout => write!(f, "timeout"),
            Self::ProviderError => write!(f, "provider_error"),
            Self::ParseFailure => write!(f, "parse_failure"),
        }
    }
}

/// Record of one network call to a provider for one model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    /// Provider that served the attempt.
    pub provider: String,
    /// Model the attempt targeted.
    pub model: String,
    /// When the attempt started.
    pub started_at: DateTime<Utc>,
    /// How the attempt ended.
    pub outcome: AttemptOutcome,
    /// Wall-clock duration of the attempt in milliseconds.
    pub latency_ms: u64,
    /// Short diagnostic for non-ok outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl AttemptRecord {
    /// Emit this record as a structured tracing event.
    pub fn log(&self) {
        match self.outcome {
            AttemptOutcome::Ok => info!(
                provider = %self.provider,
                model = %self.model,
                outcome = %self.outcome,
                latency_ms = self.latency_ms,
                "attempt completed"
            ),
            _ => warn!(
                provider = %self.provider,
                model = %self.model,
                outcome = %self.outcome,
                latency_ms = self.latency_ms,
                detail = self.detail.as_deref().unwrap_or(""),
                "attempt failed"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_classification_maps_to_outcomes() {
        assert_eq!(
            AttemptOutcome::from_failure(RetryCategory::Timeout),
            AttemptOutcome::Timeout
        );
        assert_eq!(
            AttemptOutcome::from_failure(RetryCategory::Transient),
            AttemptOutcome::ProviderError
        );
        assert_eq!(
            AttemptOutcome::from_failure(RetryCategory::ParseFailure),
            AttemptOutcome::ParseFailure
        );
    }

    #[test]
    fn outcome_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&AttemptOutcome::ProviderError).unwrap(),
            "\"provider_error\""
        );
        assert_eq!(
            serde_json::to_string(&AttemptOutcome::ParseFailure).unwrap(),
            "\"parse_failure\""
        );
    }

    #[test]
    fn record_roundtrip() {
        let record = AttemptRecord {
            provider: "openai".into(),
            model: "gpt-3.5-turbo".into(),
            started_at: Utc::now(),
            outcome: AttemptOutcome::Timeout,
            latency_ms: 30_000,
            detail: None,
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: AttemptRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.outcome, AttemptOutcome::Timeout);
        assert_eq!(parsed.model, "gpt-3.5-turbo");
    }
}
