// src/logging.rs

//! `tracing-subscriber` setup for the `tododag` binary.
//!
//! The filter comes from `--log-level` if given, else from `TODODAG_LOG`
//! (any `EnvFilter` directive string, e.g. `tododag::engine=debug`), else
//! `info`. A bare level only applies to this crate; the watcher stack stays
//! at `warn`. Output goes to stderr, keeping `graph --json` stdout clean.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "TODODAG_LOG";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let directives = filter_directives(cli_level, env.as_deref());
    let filter = EnvFilter::try_new(&directives)
        .with_context(|| format!("invalid log filter {directives:?}"))?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

/// Directive string for [`EnvFilter`] from the CLI flag and the raw value
/// of `TODODAG_LOG`.
pub fn filter_directives(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(lvl) = cli_level {
        return crate_level(level_name(lvl));
    }
    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) if raw.contains('=') || raw.contains(',') => raw.to_string(),
        Some(raw) => match raw.to_lowercase().as_str() {
            "warning" => crate_level("warn"),
            lvl @ ("error" | "warn" | "info" | "debug" | "trace") => crate_level(lvl),
            _ => crate_level("info"),
        },
        None => crate_level("info"),
    }
}

fn crate_level(level: &str) -> String {
    format!("warn,tododag={level}")
}

fn level_name(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
