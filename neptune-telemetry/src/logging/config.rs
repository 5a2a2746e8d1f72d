//! What to log, how, and where.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing_appender::rolling::{self, RollingFileAppender};

use super::LoggingError;

const LOG_FILE_NAME: &str = "neptune.log";

/// Settings consumed by [`super::init_logging`].
///
/// The default writes masked, pretty `info` lines to stderr.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
    /// Line format shared by every sink.
    pub format: LogFormat,
    /// Sinks, in installation order.
    pub outputs: Vec<LogOutput>,
    /// Adds the emitting thread to each line.
    pub thread_ids: bool,
    /// Adds file and line of the call site.
    pub source_location: bool,
    /// Redacts credentials and signatures before bytes reach a sink.
    pub mask_secrets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
            outputs: vec![LogOutput::Stderr],
            thread_ids: false,
            source_location: false,
            mask_secrets: true,
        }
    }
}

impl LogConfig {
    /// Stderr only, at `level`, in `format`.
    #[must_use]
    pub fn new(level: impl Into<String>, format: LogFormat) -> Self {
        Self {
            level: level.into(),
            format,
            ..Self::default()
        }
    }

    /// Also writes `neptune.log` under `directory`, rotated daily.
    #[must_use]
    pub fn with_file(self, directory: impl Into<PathBuf>) -> Self {
        self.with_rotated_file(directory, Rotation::Daily)
    }

    /// Also writes `neptune.log` under `directory` with the given rotation.
    #[must_use]
    pub fn with_rotated_file(mut self, directory: impl Into<PathBuf>, rotation: Rotation) -> Self {
        self.outputs.push(LogOutput::File {
            directory: directory.into(),
            rotation,
        });
        self
    }
}

/// Line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One flattened JSON object per event.
    Json,
    /// Human-readable text, colored on a terminal.
    #[default]
    Pretty,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("json") {
            Ok(Self::Json)
        } else if s.eq_ignore_ascii_case("pretty") {
            Ok(Self::Pretty)
        } else {
            Err(LoggingError::InvalidConfig(format!(
                "unknown log format '{s}', expected json or pretty"
            )))
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        })
    }
}

/// A log sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogOutput {
    /// Standard error; stdout is reserved for query results.
    Stderr,
    /// `neptune.log` in a directory created on demand.
    File {
        /// Directory holding the log files.
        directory: PathBuf,
        /// When to start a new file.
        #[serde(default)]
        rotation: Rotation,
    },
}

/// File rotation period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    /// New file every hour.
    Hourly,
    /// New file every day.
    #[default]
    Daily,
    /// One file forever.
    Never,
}

impl Rotation {
    pub(crate) fn appender(self, directory: &Path) -> RollingFileAppender {
        match self {
            Self::Hourly => rolling::hourly(directory, LOG_FILE_NAME),
            Self::Daily => rolling::daily(directory, LOG_FILE_NAME),
            Self::Never => rolling::never(directory, LOG_FILE_NAME),
        }
    }
}
