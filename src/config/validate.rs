// src/config/validate.rs

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TododagError};

static SOURCE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9_-]*$").expect("source name regex is valid")
});

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TododagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.source))
    }
}

/// True if `name` can be used as a source directory / qualified-id prefix.
pub fn is_valid_source_name(name: &str) -> bool {
    SOURCE_NAME_RE.is_match(name)
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_global_config(cfg)?;
    validate_source_order(cfg)?;
    validate_sources(cfg)?;
    Ok(())
}

fn validate_global_config(cfg: &RawConfigFile) -> Result<()> {
    let c = &cfg.config;

    if !(1..=9).contains(&c.priority_levels) {
        return Err(TododagError::ConfigError(format!(
            "[config].priority_levels must be between 1 and 9 (got {})",
            c.priority_levels
        )));
    }

    if !(1..=9).contains(&c.id_width) {
        return Err(TododagError::ConfigError(format!(
            "[config].id_width must be between 1 and 9 (got {})",
            c.id_width
        )));
    }

    if c.max_wave_width == Some(0) {
        return Err(TododagError::ConfigError(
            "[config].max_wave_width must be >= 1 (got 0); omit it for unlimited waves"
                .to_string(),
        ));
    }

    let name = c.manifest_name.trim();
    if name.is_empty() || name.contains('/') || name.contains('\\') || name.ends_with(".md") {
        return Err(TododagError::ConfigError(format!(
            "[config].manifest_name must be a plain, non-markdown file name (got '{}')",
            c.manifest_name
        )));
    }

    Ok(())
}

fn validate_source_order(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for class in &cfg.config.source_order {
        if !seen.insert(class.as_str()) {
            return Err(TododagError::ConfigError(format!(
                "[config].source_order lists '{}' more than once",
                class
            )));
        }
    }
    Ok(())
}

fn validate_sources(cfg: &RawConfigFile) -> Result<()> {
    for name in cfg.source.keys() {
        if !is_valid_source_name(name) {
            return Err(TododagError::ConfigError(format!(
                "invalid source name '{}' (expected lowercase letters, digits, '-' or '_')",
                name
            )));
        }
    }
    Ok(())
}
