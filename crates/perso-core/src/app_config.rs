//! Typed view over the INI settings used by the binary.

use std::path::PathBuf;
use std::time::Duration;

use crate::{CoreError, CoreResult, Paths, Settings};

/// Default backend host.
pub const DEFAULT_BACKEND_HOST: &str = "127.0.0.1";
/// Default backend port.
pub const DEFAULT_BACKEND_PORT: u16 = 9999;
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

const ENV_LOG_LEVEL: &str = "PERSO_LOG_LEVEL";
const ENV_BACKEND_SECRET: &str = "PERSO_BACKEND_SECRET";

/// `[BACKEND]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    pub host: String,
    pub port: u16,
    /// No secret means no channel client can be built.
    pub secret: Option<String>,
    /// Whole-exchange timeout; absent or zero disables it.
    pub timeout: Option<Duration>,
    /// Raw `CIPHER` value, parsed by the channel crate.
    pub cipher: Option<String>,
    /// Raw `NONCE` value, parsed by the channel crate.
    pub nonce_mode: Option<String>,
}

/// `[FILES]` section, resolved against the data directory.
#[derive(Debug, Clone, PartialEq)]
pub struct FileSettings {
    pub database: PathBuf,
    pub locks: PathBuf,
    /// `None` when `DebugLog` is set to an empty value.
    pub debug_log: Option<PathBuf>,
}

/// `[WEBHOOK]` section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WebhookSettings {
    /// Review notices.
    pub url: Option<String>,
    /// Bug reports.
    pub bug_report: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub backend: BackendSettings,
    pub files: FileSettings,
    pub webhook: WebhookSettings,
    pub log_level: String,
}

impl AppConfig {
    /// Build from settings, applying `PERSO_*` environment overrides.
    pub fn from_settings(settings: &Settings, paths: &Paths) -> CoreResult<Self> {
        Self::from_settings_with_env(settings, paths, |name| std::env::var(name).ok())
    }

    /// Build from settings with an explicit environment lookup.
    pub fn from_settings_with_env(
        settings: &Settings,
        paths: &Paths,
        env: impl Fn(&str) -> Option<String>,
    ) -> CoreResult<Self> {
        let port = match settings.get_int("BACKEND", "PORT", None)? {
            Some(port) => u16::try_from(port)
                .ok()
                .filter(|p| *p != 0)
                .ok_or_else(|| CoreError::Config(format!("[BACKEND] PORT out of range: {}", port)))?,
            None => DEFAULT_BACKEND_PORT,
        };

        let timeout = match settings.get("BACKEND", "TIMEOUT_SECS") {
            Some(raw) => parse_timeout(&raw)?,
            None => None,
        };

        let secret = env(ENV_BACKEND_SECRET)
            .and_then(non_empty)
            .or_else(|| settings.get("BACKEND", "SECRET").and_then(non_empty));

        let backend = BackendSettings {
            host: settings.get_or("BACKEND", "HOST", DEFAULT_BACKEND_HOST),
            port,
            secret,
            timeout,
            cipher: settings.get("BACKEND", "CIPHER").and_then(non_empty),
            nonce_mode: settings.get("BACKEND", "NONCE").and_then(non_empty),
        };

        let files = FileSettings {
            database: settings
                .get("FILES", "PersoDatabase")
                .and_then(non_empty)
                .map(|p| paths.resolve(&p))
                .unwrap_or_else(|| paths.database_file()),
            locks: settings
                .get("FILES", "Locks")
                .and_then(non_empty)
                .map(|p| paths.resolve(&p))
                .unwrap_or_else(|| paths.locks_file()),
            debug_log: match settings.get("FILES", "DebugLog") {
                Some(p) if p.trim().is_empty() => None,
                Some(p) => Some(paths.resolve(p.trim())),
                None => Some(paths.log_file()),
            },
        };

        let webhook = WebhookSettings {
            url: settings.get("WEBHOOK", "URL").and_then(non_empty),
            bug_report: settings.get("WEBHOOK", "BUGREPORT").and_then(non_empty),
        };

        let log_level = env(ENV_LOG_LEVEL)
            .and_then(non_empty)
            .or_else(|| settings.get("VARS", "LogLevel").and_then(non_empty))
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            backend,
            files,
            webhook,
            log_level,
        })
    }
}

fn parse_timeout(raw: &str) -> CoreResult<Option<Duration>> {
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| CoreError::Config(format!("[BACKEND] TIMEOUT_SECS is not a number: {}", raw)))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(CoreError::Config(format!(
            "[BACKEND] TIMEOUT_SECS must be non-negative: {}",
            raw
        )));
    }
    Ok((secs > 0.0).then(|| Duration::from_secs_f64(secs)))
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
