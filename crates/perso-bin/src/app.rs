//! Startup wiring.
//!
//! Everything a command needs is built once here, in a fixed order, and
//! handed to the command explicitly:
//!
//! settings -> logging -> record store -> locks -> channel client -> notifier
//!
//! A failure at any step aborts startup.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use perso_channel::{ChannelClient, ChannelConfig, CipherSuite, NonceMode};
use perso_core::{
    init_logging, AppConfig, BackendSettings, LogConfig, Paths, Settings, WebhookSettings,
};
use perso_store::{CooldownLocks, JsonRecordStore, RecordStore};
use tracing::{debug, info};

use crate::notify::{NoopNotifier, Notifier, WebhookNotifier};

/// Command-line overrides applied during startup.
#[derive(Debug, Clone, Default)]
pub struct StartupOptions {
    /// Base directory instead of `~/.perso`.
    pub base_dir: Option<PathBuf>,
    /// Settings file instead of `<base>/app_data/ini/variables.ini`.
    pub settings_file: Option<PathBuf>,
    /// Log level overriding the settings file.
    pub log_level: Option<String>,
}

/// Constructed dependencies.
pub struct App {
    pub config: AppConfig,
    pub store: Arc<dyn RecordStore>,
    pub locks: CooldownLocks,
    pub channel: Option<ChannelClient>,
    pub notifier: Box<dyn Notifier>,
}

impl App {
    pub fn build(options: &StartupOptions) -> Result<Self> {
        let paths = match &options.base_dir {
            Some(dir) => Paths::with_base_dir(dir.clone()),
            None => Paths::new()?,
        };
        paths.ensure_dirs()?;

        let settings_path = options
            .settings_file
            .clone()
            .unwrap_or_else(|| paths.settings_file());
        let settings = Settings::load(&settings_path)
            .with_context(|| format!("failed to load settings from {}", settings_path.display()))?;
        let config = AppConfig::from_settings(&settings, &paths)?;

        init_logging(LogConfig {
            service_name: "perso".into(),
            default_level: options
                .log_level
                .clone()
                .unwrap_or_else(|| config.log_level.clone()),
            log_file: config.files.debug_log.clone(),
            also_stderr: true,
        })?;
        debug!(settings = %settings_path.display(), "Settings loaded");

        let store = JsonRecordStore::open(&config.files.database).with_context(|| {
            format!(
                "failed to open record store {}",
                config.files.database.display()
            )
        })?;
        let locks = CooldownLocks::open(&config.files.locks)
            .with_context(|| format!("failed to open lock file {}", config.files.locks.display()))?;
        let channel = build_channel(&config.backend)?;
        let notifier = build_notifier(&config.webhook)?;

        info!(
            database = %config.files.database.display(),
            backend = ?channel.as_ref().map(|c| c.config().address()),
            webhook = config.webhook.url.is_some(),
            "Startup complete"
        );

        Ok(Self {
            config,
            store: Arc::new(store),
            locks,
            channel,
            notifier,
        })
    }

    /// The channel client, or an error explaining how to configure one.
    pub fn channel(&self) -> Result<&ChannelClient> {
        match &self.channel {
            Some(client) => Ok(client),
            None => bail!("backend not configured: set [BACKEND] SECRET or PERSO_BACKEND_SECRET"),
        }
    }
}

/// Channel client from `[BACKEND]`; `None` without a secret.
pub fn build_channel(backend: &BackendSettings) -> Result<Option<ChannelClient>> {
    let Some(secret) = &backend.secret else {
        return Ok(None);
    };

    let mut config = ChannelConfig::new(backend.host.clone(), backend.port, secret.clone());
    if let Some(timeout) = backend.timeout {
        config = config.with_timeout(timeout);
    }
    if let Some(cipher) = &backend.cipher {
        let suite: CipherSuite = cipher.parse().map_err(anyhow::Error::msg)?;
        config = config.with_cipher(suite);
    }
    if let Some(mode) = &backend.nonce_mode {
        let mode: NonceMode = mode.parse().map_err(anyhow::Error::msg)?;
        config = config.with_nonce_mode(mode);
    }

    Ok(Some(ChannelClient::new(config)))
}

/// Webhook notifier when any URL is configured, otherwise a no-op.
pub fn build_notifier(webhook: &WebhookSettings) -> Result<Box<dyn Notifier>> {
    if webhook.url.is_none() && webhook.bug_report.is_none() {
        return Ok(Box::new(NoopNotifier));
    }
    Ok(Box::new(WebhookNotifier::new(webhook)?))
}
