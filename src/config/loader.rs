// Configuration loader
// Loads ~/.mindaura/config.toml, then applies environment overrides

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use super::settings::Config;
use crate::errors::config_parse_error;

/// Default config location: `~/.mindaura/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".mindaura").join("config.toml"))
}

/// Load configuration from the default location or environment
pub fn load_config() -> Result<Config> {
    load_config_from(&default_config_path()?)
}

/// Load configuration from `path`. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    let mut config = if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| anyhow::anyhow!(config_parse_error(path, &e.to_string())))?;

        tracing::debug!(path = %path.display(), "Loaded config file");
        config
    } else {
        tracing::debug!(path = %path.display(), "No config file, using defaults");
        Config::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Apply `MINDAURA_BIND` and `GEMINI_API_KEY` on top of file settings
pub fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    if let Some(bind) = env("MINDAURA_BIND").filter(|v| !v.is_empty()) {
        config.server.bind_address = bind;
    }

    if let Some(key) = env("GEMINI_API_KEY").filter(|v| !v.is_empty()) {
        config.gemini.api_key = Some(key);
    }
}
