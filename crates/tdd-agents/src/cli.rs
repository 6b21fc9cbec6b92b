//! Command-line surface: one-shot `feature` and `status`, plus the
//! long-running `mcp` service mode on stdin/stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use orchestration::{
    AgentOrchestrator, FeatureOptions, HttpProviderClient, OutputFormat, ProviderRegistry,
};

use crate::format;
use crate::mcp::McpHandler;
use crate::settings;
use crate::status::StatusInfo;

#[derive(Debug, Parser)]
#[command(name = "tdd-agents", about = "Generate TDD artifacts from feature prompts")]
pub struct Cli {
    /// Provider catalogue TOML; built-in catalogue when absent.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate acceptance criteria, test scenarios and a complexity
    /// estimate for a feature described in natural language.
    Feature {
        /// The feature description.
        prompt: String,
        /// Primary model to use.
        #[arg(long)]
        model: Option<String>,
        /// Model to elevate to when the primary keeps failing.
        #[arg(long)]
        elevation_model: Option<String>,
        /// Pin the request to the primary model; no elevation, no fallback.
        #[arg(long)]
        force: bool,
        /// API key override for this request.
        #[arg(long)]
        api_key: Option<String>,
        /// Per-attempt timeout in seconds.
        #[arg(long)]
        timeout: Option<u64>,
        /// Extra attempts per model after the first.
        #[arg(long)]
        max_retries: Option<u32>,
        /// Sampling temperature, within [0, 2].
        #[arg(long)]
        temperature: Option<f64>,
        /// Completion token budget override.
        #[arg(long)]
        max_tokens: Option<u32>,
        /// Output format: json or markdown.
        #[arg(long, default_value = "json")]
        format: String,
    },
    /// Print configured providers, models and credential presence.
    Status,
    /// Serve the line-delimited JSON protocol on stdin/stdout.
    Mcp,
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        let registry = Arc::new(load_registry(self.config.as_deref())?);
        let defaults = settings::option_defaults_from_env();
        let credentials = settings::credentials_from_env();

        match self.command {
            Command::Feature {
                prompt,
                model,
                elevation_model,
                force,
                api_key,
                timeout,
                max_retries,
                temperature,
                max_tokens,
                format,
            } => {
                let mut options = FeatureOptions::from_defaults(&defaults);
                if let Some(model) = model {
                    options.model = model;
                }
                if let Some(model) = elevation_model {
                    options.elevation_model = model;
                }
                options.force = force;
                options.api_key = api_key;
                if let Some(timeout) = timeout {
                    options.timeout_seconds = timeout;
                }
                if let Some(max_retries) = max_retries {
                    options.max_retries = max_retries;
                }
                if let Some(temperature) = temperature {
                    options.temperature = temperature;
                }
                options.max_tokens = max_tokens;
                options.output_format = format
                    .parse::<OutputFormat>()
                    .map_err(anyhow::Error::msg)?;

                let client = Arc::new(HttpProviderClient::new(registry.clone(), credentials));
                let engine = AgentOrchestrator::new(registry, client);

                let result = engine.generate_feature(&prompt, &options).await?;
                println!("{}", format::render(&result, options.output_format));
                Ok(())
            }
            Command::Status => {
                let status = StatusInfo::collect(&registry, &credentials, 0);
                println!("{}", serde_json::to_string_pretty(&status)?);
                Ok(())
            }
            Command::Mcp => {
                let client =
                    Arc::new(HttpProviderClient::new(registry.clone(), credentials.clone()));
                let engine = Arc::new(AgentOrchestrator::new(registry, client));

                let mut handler = McpHandler::new(
                    tokio::io::stdin(),
                    tokio::io::stdout(),
                    engine,
                    defaults,
                    credentials,
                );
                tokio::select! {
                    outcome = handler.run() => outcome,
                    _ = tokio::signal::ctrl_c() => {
                        info!("interrupt received, shutting down");
                        Ok(())
                    }
                }
            }
        }
    }
}

/// Catalogue resolution order: --config flag, then the environment, then
/// the built-in catalogue.
fn load_registry(flag: Option<&std::path::Path>) -> Result<ProviderRegistry> {
    let path = flag
        .map(PathBuf::from)
        .or_else(settings::providers_file_from_env);
    match path {
        Some(path) => ProviderRegistry::load(&path),
        None => Ok(ProviderRegistry::builtin()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn feature_flags_parse() {
        let cli = Cli::parse_from([
            "tdd-agents",
            "feature",
            "user login",
            "--model",
            "gpt-4",
            "--force",
            "--temperature",
            "0.2",
            "--format",
            "markdown",
        ]);
        match cli.command {
            Command::Feature {
                prompt,
                model,
                force,
                temperature,
                format,
                ..
            } => {
                assert_eq!(prompt, "user login");
                assert_eq!(model.as_deref(), Some("gpt-4"));
                assert!(force);
                assert_eq!(temperature, Some(0.2));
                assert_eq!(format, "markdown");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn mcp_subcommand_parses() {
        let cli = Cli::parse_from(["tdd-agents", "mcp"]);
        assert!(matches!(cli.command, Command::Mcp));
    }
}
