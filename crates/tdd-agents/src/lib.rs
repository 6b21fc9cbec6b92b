//! TDD feature generation agent: CLI commands plus the line-delimited JSON
//! service mode, layered on the `orchestration` engine.

pub mod cli;
pub mod format;
pub mod mcp;
pub mod settings;
pub mod status;
