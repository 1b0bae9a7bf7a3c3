// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `tododag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "tododag",
    version,
    about = "Build dependency-ordered, wave-scheduled manifests for file-based todos.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Tododag.toml` in the current working directory. A missing
    /// file at the default location means "use built-in defaults".
    #[arg(long, global = true, value_name = "PATH", default_value = "Tododag.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TODODAG_LOG` or a default level will be used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Rebuild manifests for dirty (or selected) sources.
    Build(BuildArgs),

    /// Report structural warnings and cycles without writing anything.
    Validate(SourceSelection),

    /// Print the computed order or waves for one source.
    Graph(GraphArgs),

    /// Show the dirty/clean/stale state of every source.
    Status,

    /// Set the dirty signal for a source.
    MarkDirty {
        /// Source to mark.
        #[arg(long, value_name = "NAME")]
        source: String,
    },

    /// Rewrite the status of one item and mark its source dirty.
    SetStatus {
        /// Qualified id, e.g. `work/003`.
        #[arg(value_name = "SOURCE/ID")]
        item: String,

        /// New status (pending, ready, in_progress, complete, blocked,
        /// wont_fix, interrupted).
        #[arg(value_name = "STATUS")]
        status: String,
    },

    /// Watch the todos tree and rebuild sources as their items change.
    Watch {
        /// Override `[config].debounce_ms`.
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,
    },
}

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
    /// Rebuild every discovered source, clean or not.
    #[arg(long, conflicts_with = "source")]
    pub all: bool,

    /// Restrict the build to these sources (repeatable).
    #[arg(long, value_name = "NAME")]
    pub source: Vec<String>,

    /// Rebuild selected sources even when their dirty signal is clear.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct SourceSelection {
    /// Restrict to these sources (repeatable). Default: all sources.
    #[arg(long, value_name = "NAME")]
    pub source: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct GraphArgs {
    /// Source to render. Required when more than one source exists.
    #[arg(long, value_name = "NAME")]
    pub source: Option<String>,

    /// Group the output by execution wave.
    #[arg(long)]
    pub waves: bool,

    /// Print the manifest JSON that a build would write.
    #[arg(long, conflicts_with = "waves")]
    pub json: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
