// src/errors.rs

//! Crate-wide error aliases and helpers.
//!
//! Graph shape problems (cycles, self-deps, dangling refs) are *data* and are
//! reported through result types, never through this enum. Only configuration,
//! parse and IO failures surface here.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TododagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Source not found: {0}")]
    SourceNotFound(String),

    #[error("Source '{0}' is already claimed by another handle")]
    SourceBusy(String),

    #[error("Item not found: {0}")]
    ItemNotFound(String),

    #[error("Failed to parse item {path:?}: {message}")]
    ItemParse { path: PathBuf, message: String },

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TododagError {
    pub fn item_parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        TododagError::ItemParse {
            path: path.into(),
            message: message.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TododagError>;
