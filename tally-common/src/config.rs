//! Configuration loading and root folder resolution
//!
//! Root folder priority order:
//! 1. Command-line argument (handled by the binary)
//! 2. `TALLY_ROOT_FOLDER`, then `TALLY_ROOT` environment variable
//! 3. `root_folder` in the module's TOML config file
//! 4. OS-dependent compiled default (the platform application-data dir)
//!
//! A missing or unreadable config file is never fatal: it is logged and
//! compiled defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Name of the directory holding `*.jdb` store files
pub const JDB_DIR_NAME: &str = "jdb";

/// Default snapshot file name inside the root folder
pub const SNAPSHOT_FILE_NAME: &str = "snapshot.json";

/// Built-in defaults used when nothing else is configured
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            log_level: "info".to_string(),
        }
    }
}

/// `[logging]` table of the TOML config
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log to this file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Open the configured log file for appending, creating it and its
    /// parent directories. `None` when logging goes to stderr.
    pub fn open_file(&self) -> Result<Option<std::fs::File>> {
        let Some(path) = &self.file else {
            return Ok(None);
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Some(file))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Module TOML config file contents
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Snapshot location; relative paths are taken from the root folder
    #[serde(default)]
    pub snapshot_file: Option<PathBuf>,
}

/// Parse a TOML config file
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Resolves the root folder and config for one module
#[derive(Debug, Clone)]
pub struct RootFolderResolver {
    module_name: String,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Root folder from environment, config file or compiled default
    pub fn resolve(&self) -> PathBuf {
        for var in ["TALLY_ROOT_FOLDER", "TALLY_ROOT"] {
            if let Ok(path) = std::env::var(var) {
                if !path.trim().is_empty() {
                    debug!("Root folder from {}: {}", var, path);
                    return PathBuf::from(path);
                }
            }
        }

        if let Some(root_folder) = self.load_config().root_folder {
            debug!("Root folder from config: {}", root_folder.display());
            return root_folder;
        }

        CompiledDefaults::for_current_platform().root_folder
    }

    /// Module config, or defaults when the file is missing or invalid
    pub fn load_config(&self) -> TomlConfig {
        let Some(path) = self.config_file_path() else {
            return TomlConfig::default();
        };
        if !path.exists() {
            debug!("No config file at {}; using defaults", path.display());
            return TomlConfig::default();
        }
        match load_toml_config(&path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; using defaults", e);
                TomlConfig::default()
            }
        }
    }

    /// `<config dir>/tally/<module>.toml`, falling back to `/etc/tally` on Linux
    pub fn config_file_path(&self) -> Option<PathBuf> {
        let file_name = format!("{}.toml", self.module_name);
        let user_config = dirs::config_dir().map(|d| d.join("tally").join(&file_name));

        if cfg!(target_os = "linux") {
            if let Some(path) = &user_config {
                if path.exists() {
                    return user_config;
                }
            }
            let system_config = PathBuf::from("/etc/tally").join(&file_name);
            if system_config.exists() {
                return Some(system_config);
            }
        }
        user_config
    }
}

/// Prepares the root folder layout
#[derive(Debug, Clone)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root and store directories (idempotent)
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(self.jdb_dir())?;
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root_folder
    }

    /// Directory holding the store files
    pub fn jdb_dir(&self) -> PathBuf {
        self.root_folder.join(JDB_DIR_NAME)
    }

    /// Snapshot file, honouring a configured override
    pub fn snapshot_path(&self, configured: Option<&Path>) -> PathBuf {
        match configured {
            Some(path) if path.is_absolute() => path.to_path_buf(),
            Some(path) => self.root_folder.join(path),
            None => self.root_folder.join(SNAPSHOT_FILE_NAME),
        }
    }
}

/// OS application-data directory for Tally
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/tally
        dirs::data_dir()
            .map(|d| d.join("tally"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/tally"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/tally
        dirs::data_dir()
            .map(|d| d.join("tally"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/tally"))
    } else if cfg!(target_os = "windows") {
        // %APPDATA%\tally
        dirs::data_dir()
            .map(|d| d.join("tally"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\tally"))
    } else {
        PathBuf::from("./tally_data")
    }
}
