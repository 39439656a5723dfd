//! Configuration file I/O: path resolution, loading, and saving.

use std::path::{Path, PathBuf};

use super::Config;

/// Returns the platform-specific configuration directory for `lumen_text`.
pub fn config_dir() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("lumen_text");
        }
        PathBuf::from(".").join("lumen_text")
    }
    #[cfg(not(target_os = "windows"))]
    {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join("lumen_text");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home).join(".config").join("lumen_text");
        }
        PathBuf::from(".").join("lumen_text")
    }
}

/// Returns the path to the config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

impl Config {
    /// Loads config from the default path. Returns defaults if the file
    /// doesn't exist or can't be parsed.
    pub fn load() -> Self {
        Self::load_from(&config_path())
    }

    /// Loads config from `path`, falling back to defaults (logged).
    pub fn load_from(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(d) => d,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    log::info!("config: {} not found, using defaults", path.display());
                } else {
                    log::warn!("config: failed to read {}: {e}", path.display());
                }
                return Self::default();
            }
        };

        match toml::from_str(&data) {
            Ok(cfg) => {
                log::info!("config: loaded from {}", path.display());
                cfg
            }
            Err(e) => {
                log::warn!("config: parse error in {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Tries to load config, returning an error message on failure.
    /// Unlike `load_from()`, this keeps "file missing" and "parse error"
    /// distinct from "use defaults".
    pub fn try_load_from(path: &Path) -> Result<Self, String> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
        toml::from_str(&data).map_err(|e| format!("parse error in {}: {e}", path.display()))
    }

    /// Saves config to `path`. Creates the directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        save_toml(self, path)
    }

    /// Pretty TOML rendering of this config.
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("serialize error: {e}"))
    }
}

/// Serialize a value to TOML and write it to `path`, creating the parent directory if needed.
fn save_toml(value: &impl serde::Serialize, path: &Path) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("failed to create dir {}: {e}", dir.display()))?;
    }
    let data = toml::to_string_pretty(value).map_err(|e| format!("serialize error: {e}"))?;
    std::fs::write(path, data).map_err(|e| format!("failed to write {}: {e}", path.display()))?;
    log::info!("config: saved to {}", path.display());
    Ok(())
}
