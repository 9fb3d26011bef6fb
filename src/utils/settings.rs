//! Settings and configuration utilities.
//!
//! This module reads settings from $HOME/.recommit/settings.json, uses them as a
//! fallback for environment variables, and locates the author pool file.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

/// Environment variable naming the author pool file.
pub const AUTHORS_ENV_VAR: &str = "RECOMMIT_AUTHORS";

/// Name of the per-user configuration directory under $HOME.
const CONFIG_DIR: &str = ".recommit";

/// Settings loaded from $HOME/.recommit/settings.json.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Environment variable overrides.
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Loads settings from the default location.
    pub fn load() -> Result<Self> {
        let settings_path = Self::get_settings_path()?;
        Self::load_from_path(&settings_path)
    }

    /// Loads settings from a specific path.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist, return default settings
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        serde_json::from_str::<Self>(&content)
            .with_context(|| format!("Failed to parse settings file: {}", path.display()))
    }

    /// Returns the default settings path.
    pub fn get_settings_path() -> Result<PathBuf> {
        Ok(config_dir()?.join("settings.json"))
    }

    /// Returns an environment variable with fallback to settings.
    pub fn get_env_var(&self, key: &str) -> Option<String> {
        match env::var(key) {
            Ok(value) => Some(value),
            Err(_) => self.env.get(key).cloned(),
        }
    }
}

fn config_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().context("Failed to determine home directory")?;
    Ok(home_dir.join(CONFIG_DIR))
}

/// Locates the author pool file.
///
/// An explicit path wins, then `RECOMMIT_AUTHORS` from the environment or the
/// settings file, then `$HOME/.recommit/authors.yaml`.
pub fn author_pool_path(explicit: Option<&Path>, settings: &Settings) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }

    if let Some(path) = settings.get_env_var(AUTHORS_ENV_VAR) {
        debug!("Using author pool from {AUTHORS_ENV_VAR}: {path}");
        return Ok(PathBuf::from(path));
    }

    Ok(config_dir()?.join("authors.yaml"))
}
