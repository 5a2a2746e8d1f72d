//! # Neptune CLI
//!
//! Command-line client for Amazon Neptune with IAM authentication.
//!
//! This CLI provides commands for:
//! - Running the sample graph script
//! - Submitting a single Gremlin query
//! - Inspecting the signed handshake headers
//! - Showing the resolved configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;

use commands::{info, query, run, sign};
use neptune_core::config::{ConfigLoader, NeptuneConfig, Validatable};
use neptune_telemetry::logging::{LogConfig, LogFormat, init_logging};

/// Environment variable prefix for configuration overrides.
const ENV_PREFIX: &str = "NEPTUNE";

/// Neptune - Gremlin over SigV4-signed WebSockets
#[derive(Parser)]
#[command(name = "neptune")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (TOML, YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Neptune cluster endpoint as host[:port]
    #[arg(long, global = true)]
    endpoint: Option<String>,

    /// Neptune port when the endpoint has none
    #[arg(long, global = true)]
    port: Option<u16>,

    /// AWS region used for signing
    #[arg(long, global = true)]
    region: Option<String>,

    /// Load balancer to connect through
    #[arg(long, global = true)]
    elb_endpoint: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Subcommand to execute (defaults to `run`)
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the sample graph script
    Run,

    /// Submit a single Gremlin query
    Query(query::QueryArgs),

    /// Print the signed handshake headers
    Sign(sign::SignArgs),

    /// Show version and resolved configuration
    Info,
}

impl Cli {
    /// Loads configuration from the file and environment, then applies flags.
    fn load_config(&self) -> Result<NeptuneConfig> {
        let loader = ConfigLoader::new()
            .with_env_prefix(ENV_PREFIX)
            .with_validation(false);

        let mut config: NeptuneConfig = match &self.config {
            Some(path) => loader
                .load_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => loader.load_defaults()?,
        };

        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut NeptuneConfig) {
        if let Some(endpoint) = &self.endpoint {
            config.connection.endpoint.clone_from(endpoint);
        }
        if let Some(port) = self.port {
            config.connection.port = port;
        }
        if let Some(region) = &self.region {
            config.connection.region.clone_from(region);
        }
        if let Some(elb) = &self.elb_endpoint {
            config.connection.elb_endpoint = Some(elb.clone());
        }
        if let Some(format) = &self.log_format {
            config.logging.format.clone_from(format);
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

fn log_config(config: &NeptuneConfig) -> Result<LogConfig> {
    let format: LogFormat = config.logging.format.parse()?;
    let mut log_config = LogConfig::new(&config.logging.level, format);
    if let Some(directory) = &config.logging.directory {
        log_config = log_config.with_file(directory);
    }
    Ok(log_config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.load_config()?;
    let _guards = init_logging(&log_config(&config)?)?;
    debug!(config = ?cli.config, "Configuration loaded");

    if matches!(cli.command, Some(Commands::Info)) {
        return info::show(&config);
    }

    config.validate().context("Invalid configuration")?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run::execute(&config).await?,
        Commands::Query(args) => query::execute(&config, &args).await?,
        Commands::Sign(args) => sign::execute(&config, &args)?,
        Commands::Info => info::show(&config)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_run_is_default() {
        let cli = Cli::try_parse_from(["neptune"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[connection]\nendpoint = \"file-host:8182\"\nregion = \"eu-west-1\""
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "neptune",
            "--config",
            file.path().to_str().unwrap(),
            "--endpoint",
            "flag-host",
            "--port",
            "9999",
            "--elb-endpoint",
            "my-elb.example.com",
            "query",
            "g.V().count()",
        ])
        .unwrap();

        let config = cli.load_config().unwrap();
        assert_eq!(config.connection.endpoint, "flag-host");
        assert_eq!(config.connection.port, 9999);
        assert_eq!(config.connection.region, "eu-west-1");
        assert_eq!(config.connection.elb_endpoint.as_deref(), Some("my-elb.example.com"));
        assert!(matches!(cli.command, Some(Commands::Query(_))));
    }

    #[test]
    fn test_verbose_sets_debug() {
        let cli = Cli::try_parse_from(["neptune", "-v", "--log-format", "json", "info"]).unwrap();
        let mut config = NeptuneConfig::default();
        cli.apply_overrides(&mut config);

        let log = log_config(&config).unwrap();
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Json);
    }

    #[test]
    fn test_log_directory_adds_file_output() {
        let mut config = NeptuneConfig::default();
        config.logging.directory = Some("/tmp/neptune-logs".to_string());

        let log = log_config(&config).unwrap();
        assert_eq!(log.outputs.len(), 2);
    }
}
