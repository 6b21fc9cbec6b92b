//! Line-delimited JSON protocol handler (MCP service mode).
//!
//! Reads one JSON message per line from the input stream, dispatches it, and
//! writes exactly one JSON response per inbound message. The loop is
//! single-threaded and strictly sequential: a message is fully processed
//! (including provider calls) before the next read.
//!
//! ```text
//! Idle → AwaitingMessage → Dispatching → Responding → AwaitingMessage
//!                        └────────────── end of input ──────→ Closed
//! ```
//!
//! A malformed message or a failed orchestration never terminates the loop;
//! both become `status: error` responses.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use orchestration::{
    AgentOrchestrator, FeatureOptions, OptionDefaults, OrchestrationError, ProviderCredentials,
};

use crate::status::StatusInfo;

/// Inbound message shape. Missing `content` or `metadata.type` fails
/// deserialization and is answered with a protocol error.
#[derive(Debug, Clone, Deserialize)]
pub struct McpMessage {
    pub content: String,
    pub metadata: McpMetadata,
}

#[derive(Debug, Clone, Deserialize)]
pub struct McpMetadata {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub status: ResponseStatus,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Outbound response: exactly one per inbound message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub content: Value,
    pub metadata: ResponseMetadata,
}

impl McpResponse {
    pub fn success(kind: &str, content: Value) -> Self {
        Self {
            content,
            metadata: ResponseMetadata {
                status: ResponseStatus::Success,
                kind: kind.to_string(),
            },
        }
    }

    pub fn error(kind: &str, message: impl Into<String>) -> Self {
        Self {
            content: json!({ "error": message.into() }),
            metadata: ResponseMetadata {
                status: ResponseStatus::Error,
                kind: kind.to_string(),
            },
        }
    }
}

/// Protocol session states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    AwaitingMessage,
    Dispatching,
    Responding,
    Closed,
}

/// The protocol loop, generic over its streams so tests can drive it with
/// in-memory buffers.
pub struct McpHandler<R, W> {
    reader: BufReader<R>,
    writer: W,
    engine: Arc<AgentOrchestrator>,
    defaults: OptionDefaults,
    credentials: ProviderCredentials,
    started: Instant,
    state: SessionState,
}

impl<R, W> McpHandler<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        reader: R,
        writer: W,
        engine: Arc<AgentOrchestrator>,
        defaults: OptionDefaults,
        credentials: ProviderCredentials,
    ) -> Self {
        Self {
            reader: BufReader::new(reader),
            writer,
            engine,
            defaults,
            credentials,
            started: Instant::now(),
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Recover the writer, e.g. to inspect responses in tests.
    pub fn into_writer(self) -> W {
        self.writer
    }

    /// Run the read-dispatch-write loop until end of input.
    ///
    /// Returns `Ok` on a clean close; only I/O failures on the streams
    /// themselves are errors.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        info!("mcp session starting");
        let mut line = String::new();
        loop {
            self.state = SessionState::AwaitingMessage;
            line.clear();
            let read = self.reader.read_line(&mut line).await?;
            if read == 0 {
                break;
            }
            let raw = line.trim();
            if raw.is_empty() {
                continue;
            }

            self.state = SessionState::Dispatching;
            let response = self.dispatch(raw).await;

            self.state = SessionState::Responding;
            let payload = serde_json::to_string(&response)?;
            self.writer.write_all(payload.as_bytes()).await?;
            self.writer.write_all(b"\n").await?;
            self.writer.flush().await?;
        }
        self.state = SessionState::Closed;
        info!("mcp session closed");
        Ok(())
    }

    /// Route one raw message to a handler. Every path produces a response.
    async fn dispatch(&self, raw: &str) -> McpResponse {
        let message: McpMessage = match serde_json::from_str(raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(error = %e, "malformed mcp message");
                return McpResponse::error("protocol_format", format!("malformed message: {e}"));
            }
        };

        match message.metadata.kind.as_str() {
            "feature" => self.handle_feature(&message).await,
            "status" => self.handle_status(),
            other => {
                warn!(kind = %other, "unsupported mcp message type");
                McpResponse::error(
                    "unsupported_type",
                    format!("unsupported message type '{other}'"),
                )
            }
        }
    }

    async fn handle_feature(&self, message: &McpMessage) -> McpResponse {
        let options = match FeatureOptions::from_metadata(&message.metadata.options, &self.defaults)
        {
            Ok(options) => options,
            Err(e) => return McpResponse::error(e.kind(), e.to_string()),
        };

        match self.engine.generate_feature(&message.content, &options).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(content) => McpResponse::success("feature", content),
                Err(e) => McpResponse::error("internal", e.to_string()),
            },
            Err(e) => {
                if matches!(e, OrchestrationError::ChainExhausted { .. }) {
                    warn!(error = %e, "feature request exhausted the fallback chain");
                }
                McpResponse::error(e.kind(), e.to_string())
            }
        }
    }

    fn handle_status(&self) -> McpResponse {
        let status = StatusInfo::collect(
            self.engine.registry(),
            &self.credentials,
            self.started.elapsed().as_secs(),
        );
        match serde_json::to_value(&status) {
            Ok(content) => McpResponse::success("status", content),
            Err(e) => McpResponse::error("internal", e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_response_shape() {
        let response = McpResponse::error("protocol_format", "bad");
        assert_eq!(response.metadata.status, ResponseStatus::Error);
        assert_eq!(response.metadata.kind, "protocol_format");
        assert_eq!(response.content["error"], "bad");
    }

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&ResponseStatus::Success).unwrap();
        assert_eq!(json, "\"success\"");
    }

    #[test]
    fn message_requires_content_and_type() {
        assert!(serde_json::from_str::<McpMessage>(r#"{"bad": true}"#).is_err());
        assert!(serde_json::from_str::<McpMessage>(
            r#"{"content": "x", "metadata": {}}"#
        )
        .is_err());
        assert!(serde_json::from_str::<McpMessage>(
            r#"{"content": "x", "metadata": {"type": "status"}}"#
        )
        .is_ok());
    }
}
