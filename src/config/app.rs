// src/config/app.rs
use super::defaults::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::consts::{CONFIG_ENV, DEFAULT_CONFIG_FILE};
use crate::error::CoreError;
use crate::pipeline::CleanOptions;

pub type Result<T> = std::result::Result<T, CoreError>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub filter: Filter,
    pub kdf: Kdf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Filter {
    pub min_assistant_messages: usize,
}

/// Must match whatever wrote the containers; only lower it for tests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Kdf {
    pub iterations: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            filter: default_filter(),
            kdf: default_kdf(),
        }
    }
}

impl Default for Filter {
    fn default() -> Self {
        default_filter()
    }
}

impl Default for Kdf {
    fn default() -> Self {
        default_kdf()
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.kdf.iterations == 0 {
            return Err(CoreError::Config("kdf.iterations must be at least 1".into()));
        }
        Ok(())
    }

    pub fn clean_options(&self) -> CleanOptions {
        CleanOptions {
            min_assistant_messages: self.filter.min_assistant_messages,
            kdf_iterations: self.kdf.iterations,
        }
    }
}

/// Resolve and load the config file
///
/// Lookup order: `explicit`, then `$ARCX_CLEAN_CONFIG`, then
/// `arcx-clean.toml` in the working directory. Only the last one may be
/// missing; with no file at all the built-in defaults apply.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let named = explicit
        .map(Path::to_path_buf)
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));

    match named {
        Some(path) => from_path(&path),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => from_path(DEFAULT_CONFIG_FILE),
        None => {
            debug!("no config file, using built-in defaults");
            Ok(Config::default())
        }
    }
}

pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .map_err(|e| CoreError::Config(format!("{}: {e}", path.display())))?;
    let config = from_toml_str(&content).map_err(|e| match e {
        CoreError::Config(msg) => CoreError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

pub fn from_toml_str(content: &str) -> Result<Config> {
    let config: Config =
        toml::from_str(content).map_err(|e| CoreError::Config(format!("invalid TOML: {e}")))?;
    config.validate()?;
    Ok(config)
}
