//! Logging initialization.
//!
//! Compact human-readable output on stderr, plus an optional plain-text
//! debug log file. The level comes from `RUST_LOG` when set, otherwise from
//! the configured default.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::{CoreError, CoreResult};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Name logged once at startup.
    pub service_name: String,
    /// Filter used when `RUST_LOG` is unset (e.g. `info`, `perso_channel=debug`).
    pub default_level: String,
    /// Append log lines to this file as well.
    pub log_file: Option<PathBuf>,
    /// Write to stderr.
    pub also_stderr: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            service_name: "perso".into(),
            default_level: "info".into(),
            log_file: None,
            also_stderr: true,
        }
    }
}

/// Install the global subscriber.
///
/// Fails if the log file cannot be opened or a subscriber is already set.
pub fn init_logging(config: LogConfig) -> CoreResult<()> {
    let file_layer = match &config.log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file))
                    .with_filter(build_filter(&config.default_level)),
            )
        }
        None => None,
    };

    let stderr_layer = config.also_stderr.then(|| {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(false)
            .with_line_number(false)
            .compact()
            .with_writer(io::stderr)
            .with_filter(build_filter(&config.default_level))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|e| CoreError::Logging(e.to_string()))?;

    tracing::debug!(
        service = %config.service_name,
        log_file = ?config.log_file,
        "logging initialized"
    );
    Ok(())
}

fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new(parse_level(default_level).to_string()))
}

/// Parse a log level string into a tracing Level.
pub fn parse_level(level: &str) -> tracing::Level {
    match level.trim().to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" | "warning" => tracing::Level::WARN,
        "error" | "critical" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}
