//! Orchestration error taxonomy with retry classification.
//!
//! Every failure mode in the orchestration layer is represented here. Callers
//! can query `is_retriable()` / `retry_category()` without string matching.
//!
//! Propagation policy: provider-level failures (`ProviderTimeout`,
//! `ProviderResponse`, `InvalidResponse`) are consumed inside the engine as
//! retry/elevation steps. Only `ChainExhausted`, `InvalidOptions`, and
//! `UnknownModel` cross the engine boundary.

use std::fmt;

use thiserror::Error;

use crate::telemetry::AttemptRecord;

/// Classification used by the engine to decide whether to retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryCategory {
    /// Attempt exceeded its deadline; retry on the same chain entry.
    Timeout,
    /// Provider returned an error (network, 5xx, rate limit); retry.
    Transient,
    /// Provider returned but the response failed shape validation; retry.
    ParseFailure,
    /// Terminal for the current request; surface to the caller.
    Fatal,
}

impl RetryCategory {
    pub fn is_retriable(self) -> bool {
        matches!(self, Self::Timeout | Self::Transient | Self::ParseFailure)
    }
}

impl fmt::Display for RetryCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::Transient => write!(f, "transient"),
            Self::ParseFailure => write!(f, "parse_failure"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Unified error type for the orchestration engine.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    // Retriable: never escape the engine.
    /// One attempt exceeded its per-call deadline.
    #[error("provider call timed out after {timeout_seconds}s on {model}")]
    ProviderTimeout { model: String, timeout_seconds: u64 },

    /// The provider call itself failed (network, HTTP error, rate limit).
    #[error("provider error on {model}: {message}")]
    ProviderResponse { model: String, message: String },

    /// The provider returned text that failed FeatureResult shape validation.
    #[error("response from {model} failed validation: {message}")]
    InvalidResponse { model: String, message: String },

    // Terminal.
    /// Every model in the fallback chain exhausted its retries.
    #[error("fallback chain exhausted after {} attempts", attempts.len())]
    ChainExhausted { attempts: Vec<AttemptRecord> },

    /// Malformed `FeatureOptions`; rejected before any provider call.
    #[error("invalid options: {0}")]
    InvalidOptions(String),

    /// No configured provider declares the requested model.
    #[error("no provider declares model '{0}'")]
    UnknownModel(String),
}

impl OrchestrationError {
    /// Classify this error for retry logic.
    pub fn retry_category(&self) -> RetryCategory {
        match self {
            Self::ProviderTimeout { .. } => RetryCategory::Timeout,
            Self::ProviderResponse { .. } => RetryCategory::Transient,
            Self::InvalidResponse { .. } => RetryCategory::ParseFailure,
            Self::ChainExhausted { .. } | Self::InvalidOptions(_) | Self::UnknownModel(_) => {
                RetryCategory::Fatal
            }
        }
    }

    /// Returns `true` if the engine may retry after this error.
    pub fn is_retriable(&self) -> bool {
        self.retry_category().is_retriable()
    }

    /// Stable machine-readable kind for protocol error responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ProviderTimeout { .. } => "provider_timeout",
            Self::ProviderResponse { .. } => "provider_error",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::ChainExhausted { .. } => "chain_exhausted",
            Self::InvalidOptions(_) => "invalid_options",
            Self::UnknownModel(_) => "unknown_model",
        }
    }
}
