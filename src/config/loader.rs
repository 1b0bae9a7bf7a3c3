// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// Relative paths inside the config (e.g. `todos_dir`) are resolved against
/// the directory containing the file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config.with_base_dir(config_root_dir(path)))
}

/// Like [`load_and_validate`], but a missing file at the *default* location
/// yields the built-in defaults. A missing file anywhere else is an error.
pub fn load_or_default(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    if !path.exists() && path == default_config_path() {
        debug!(?path, "no config file at default location; using defaults");
        return Ok(ConfigFile::default());
    }
    load_and_validate(path)
}

/// Default config path: `Tododag.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Tododag.toml")
}

/// - If the config path has a non-empty parent (e.g. "configs/Tododag.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Tododag.toml" (parent = ""),
///   we fall back to ".".
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
