//! File system paths.

use crate::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

const DATA_DIR_NAME: &str = "app_data";

/// Locations of the settings file and the data files it points to.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory (~/.perso)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.perso`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;
        Ok(Self {
            base_dir: home.join(".perso"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Get the data directory (`<base>/app_data`).
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join(DATA_DIR_NAME)
    }

    /// Get the settings file (`<base>/app_data/ini/variables.ini`).
    pub fn settings_file(&self) -> PathBuf {
        self.data_dir().join("ini").join("variables.ini")
    }

    /// Default record database (`<base>/app_data/personen.json`).
    pub fn database_file(&self) -> PathBuf {
        self.data_dir().join("personen.json")
    }

    /// Default cooldown lock file (`<base>/app_data/locks.json`).
    pub fn locks_file(&self) -> PathBuf {
        self.data_dir().join("locks.json")
    }

    /// Default debug log (`<base>/app_data/logfile.log`).
    pub fn log_file(&self) -> PathBuf {
        self.data_dir().join("logfile.log")
    }

    /// Resolve a configured path: absolute paths are kept, relative ones
    /// are taken from the data directory.
    pub fn resolve(&self, configured: &str) -> PathBuf {
        let path = Path::new(configured);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir().join(path)
        }
    }

    /// Ensure all required directories exist.
    pub fn ensure_dirs(&self) -> CoreResult<()> {
        std::fs::create_dir_all(self.data_dir().join("ini"))?;
        Ok(())
    }
}
