//! INI settings with section/key lookups.
//!
//! ```ini
//! [BACKEND]
//! HOST = 127.0.0.1
//! PORT = 9999
//! ```
//!
//! Lookups take a section and a key. Keys match case-insensitively.

use config::{Config, File, FileFormat, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::{CoreError, CoreResult};

/// Parsed settings file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Lowercased section -> lowercased key -> raw value.
    sections: HashMap<String, HashMap<String, String>>,
    path: Option<PathBuf>,
}

impl Settings {
    /// Load settings from an INI file.
    ///
    /// A missing file is created empty, so the operator has a place to put
    /// values; the result is then empty settings.
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::File::create(path)?;
        }

        let config = Config::builder()
            .add_source(File::from(path).format(FileFormat::Ini).required(false))
            .build()?;

        let mut settings = Self::from_config(&config)?;
        settings.path = Some(path.to_path_buf());
        Ok(settings)
    }

    /// Parse settings from INI text.
    pub fn from_ini(content: &str) -> CoreResult<Self> {
        let config = Config::builder()
            .add_source(File::from_str(content, FileFormat::Ini))
            .build()?;
        Self::from_config(&config)
    }

    /// Empty settings; every lookup falls back.
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_config(config: &Config) -> CoreResult<Self> {
        let mut sections = HashMap::new();
        for (name, value) in config.cache.clone().into_table()? {
            // Keys outside any section are ignored.
            let Ok(table) = value.into_table() else {
                continue;
            };
            let entries: &mut HashMap<String, String> =
                sections.entry(name.to_lowercase()).or_default();
            for (key, value) in table {
                entries.insert(key.to_lowercase(), stringify(value)?);
            }
        }
        Ok(Self {
            sections,
            path: None,
        })
    }

    /// File these settings were loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// String value, or `None` when absent.
    pub fn get(&self, section: &str, key: &str) -> Option<String> {
        self.sections
            .get(&section.to_lowercase())?
            .get(&key.to_lowercase())
            .cloned()
    }

    /// String value, or `default` when absent.
    pub fn get_or(&self, section: &str, key: &str, default: &str) -> String {
        self.get(section, key).unwrap_or_else(|| default.to_string())
    }

    /// Integer value. Absent keys yield `fallback`; unparsable values fail.
    pub fn get_int(&self, section: &str, key: &str, fallback: Option<i64>) -> CoreResult<Option<i64>> {
        match self.get(section, key) {
            Some(raw) => raw
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| invalid(section, key, &raw, "an integer")),
            None => Ok(fallback),
        }
    }

    /// Boolean value (`true/false`, `yes/no`, `on/off`, `1/0`). Absent keys
    /// yield `fallback`; unparsable values fail.
    pub fn get_bool(
        &self,
        section: &str,
        key: &str,
        fallback: Option<bool>,
    ) -> CoreResult<Option<bool>> {
        match self.get(section, key) {
            Some(raw) => match raw.trim().to_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Ok(Some(true)),
                "false" | "no" | "off" | "0" => Ok(Some(false)),
                _ => Err(invalid(section, key, &raw, "a boolean")),
            },
            None => Ok(fallback),
        }
    }
}

fn stringify(value: Value) -> CoreResult<String> {
    Ok(value.into_string()?)
}

fn invalid(section: &str, key: &str, raw: &str, expected: &str) -> CoreError {
    CoreError::Config(format!("[{}] {} is not {}: {:?}", section, key, expected, raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const SAMPLE: &str = r#"
[DISCORD]
GUILD = 123456789
DATABASE = 42

[BACKEND]
HOST = db.internal
PORT = 7000
TLS = yes

[FILES]
PersoDatabase = personen.json
"#;

    #[test]
    fn test_get_string() {
        let settings = Settings::from_ini(SAMPLE).unwrap();
        assert_eq!(settings.get("BACKEND", "HOST").as_deref(), Some("db.internal"));
        assert_eq!(
            settings.get("FILES", "PersoDatabase").as_deref(),
            Some("personen.json")
        );
    }

    #[test]
    fn test_get_is_case_insensitive() {
        let settings = Settings::from_ini(SAMPLE).unwrap();
        assert_eq!(settings.get("backend", "host").as_deref(), Some("db.internal"));
        assert_eq!(settings.get("BACKEND", "HOST").as_deref(), Some("db.internal"));
    }

    #[test]
    fn test_get_missing_returns_none() {
        let settings = Settings::from_ini(SAMPLE).unwrap();
        assert!(settings.get("BACKEND", "MISSING").is_none());
        assert!(settings.get("NOSECTION", "HOST").is_none());
        assert_eq!(settings.get_or("BACKEND", "MISSING", "fallback"), "fallback");
    }

    #[test]
    fn test_get_int() {
        let settings = Settings::from_ini(SAMPLE).unwrap();
        assert_eq!(settings.get_int("BACKEND", "PORT", None).unwrap(), Some(7000));
        assert_eq!(settings.get_int("BACKEND", "NOPE", Some(5)).unwrap(), Some(5));
        assert_eq!(settings.get_int("BACKEND", "NOPE", None).unwrap(), None);
    }

    #[test]
    fn test_get_int_rejects_garbage() {
        let settings = Settings::from_ini(SAMPLE).unwrap();
        assert!(settings.get_int("BACKEND", "HOST", None).is_err());
    }

    #[test]
    fn test_get_bool() {
        let settings = Settings::from_ini(SAMPLE).unwrap();
        assert_eq!(settings.get_bool("BACKEND", "TLS", None).unwrap(), Some(true));
        assert_eq!(settings.get_bool("BACKEND", "NOPE", Some(false)).unwrap(), Some(false));
        assert!(settings.get_bool("BACKEND", "HOST", None).is_err());
    }

    #[test]
    fn test_load_creates_missing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("app_data").join("ini").join("variables.ini");

        let settings = Settings::load(&path).unwrap();

        assert!(path.exists());
        assert_eq!(settings.path(), Some(path.as_path()));
        assert!(settings.get("BACKEND", "HOST").is_none());
    }

    #[test]
    fn test_load_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("variables.ini");
        std::fs::write(&path, SAMPLE).unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.get_int("DISCORD", "GUILD", None).unwrap(), Some(123456789));
    }

    #[test]
    fn test_empty_settings() {
        let settings = Settings::empty();
        assert!(settings.get("ANY", "KEY").is_none());
        assert_eq!(settings.get_int("ANY", "KEY", Some(1)).unwrap(), Some(1));
    }
}
