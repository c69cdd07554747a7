//! Core types, configuration, and utilities for Perso.

mod app_config;
mod error;
mod logging;
mod paths;
mod settings;

pub use app_config::{
    AppConfig, BackendSettings, FileSettings, WebhookSettings, DEFAULT_BACKEND_HOST,
    DEFAULT_BACKEND_PORT, DEFAULT_LOG_LEVEL,
};
pub use error::{CoreError, CoreResult};
pub use logging::{init_logging, parse_level, LogConfig};
pub use paths::Paths;
pub use settings::Settings;
