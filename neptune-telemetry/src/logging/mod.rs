//! Subscriber installation.
//!
//! `RUST_LOG`, when set, wins over [`LogConfig::level`].

mod config;
mod writer;

pub use config::{LogConfig, LogFormat, LogOutput, Rotation};
pub use writer::{MaskingMakeWriter, MaskingWriter};

use crate::masking::SensitiveDataMasker;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber described by `config`.
///
/// File sinks write through a background thread; keep the returned guards
/// alive until exit or buffered lines are lost.
///
/// # Example
///
/// ```no_run
/// use neptune_telemetry::logging::{LogConfig, init_logging};
///
/// let config = LogConfig::default();
/// let _guards = init_logging(&config).expect("Failed to initialize logging");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<Vec<WorkerGuard>, LoggingError> {
    let mut guards = Vec::new();
    let masker = Arc::new(SensitiveDataMasker::new());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| LoggingError::InvalidConfig(format!("log level '{}': {e}", config.level)))?;

    let mut layers: Vec<Box<dyn Layer<_> + Send + Sync>> = Vec::new();

    for output in &config.outputs {
        match output {
            LogOutput::Stderr => {
                let writer = masked(config, std::io::stderr, &masker);
                layers.push(format_layer(config, writer, true));
            }
            LogOutput::File { directory, rotation } => {
                std::fs::create_dir_all(directory)?;
                let (non_blocking, guard) =
                    tracing_appender::non_blocking(rotation.appender(directory));
                let writer = masked(config, non_blocking, &masker);
                layers.push(format_layer(config, writer, false));
                guards.push(guard);
            }
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(guards)
}

fn masked<M>(config: &LogConfig, inner: M, masker: &Arc<SensitiveDataMasker>) -> MaskingMakeWriter<M> {
    let masker = if config.mask_secrets {
        Arc::clone(masker)
    } else {
        Arc::new(SensitiveDataMasker::disabled())
    };
    MaskingMakeWriter::new(inner, masker)
}

fn format_layer<S, W>(config: &LogConfig, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a> + 'static,
    W: for<'w> fmt::MakeWriter<'w> + Send + Sync + 'static,
{
    let base = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_thread_ids(config.thread_ids)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    match config.format {
        LogFormat::Json => base.json().flatten_event(true).boxed(),
        LogFormat::Pretty => base.with_ansi(ansi).boxed(),
    }
}

/// Why logging could not be set up.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log directory could not be created.
    #[error("Failed to create log directory: {0}")]
    DirectoryCreation(#[from] std::io::Error),

    /// Unknown format or unparsable level directive.
    #[error("Invalid logging configuration: {0}")]
    InvalidConfig(String),

    /// Another global subscriber got there first.
    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_output_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs");
        let config = LogConfig {
            outputs: vec![LogOutput::File {
                directory: path.clone(),
                rotation: Rotation::Never,
            }],
            ..LogConfig::default()
        };

        match init_logging(&config) {
            Ok(guards) => assert_eq!(guards.len(), 1),
            Err(e) => assert!(matches!(e, LoggingError::AlreadyInitialized(_))),
        }
        assert!(path.is_dir());
    }
}
