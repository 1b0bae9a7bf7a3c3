// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::types::SortStrategy;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// todos_dir = "todos"
/// priority_levels = 3
/// max_wave_width = 4
///
/// [source.pr-review]
/// class = "review"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Per-source overrides from `[source.<name>]`.
    ///
    /// Sources do not have to be listed here; any directory under
    /// `todos_dir` is a source.
    #[serde(default)]
    pub source: BTreeMap<String, SourceConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigSection {
    /// Root of the todo tree, relative to the config file's directory.
    #[serde(default = "default_todos_dir")]
    pub todos_dir: PathBuf,

    /// Number of priority classes (`p1` .. `pN`).
    #[serde(default = "default_priority_levels")]
    pub priority_levels: u8,

    /// Minimum digits of an item id; numeric ids are zero-padded to this.
    #[serde(default = "default_id_width")]
    pub id_width: usize,

    /// Maximum number of items per wave. `None` keeps the natural
    /// (longest-path) waves.
    #[serde(default)]
    pub max_wave_width: Option<usize>,

    #[serde(default)]
    pub sort_strategy: SortStrategy,

    /// File name of the per-source manifest.
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Source classes in tie-break order. Review findings gate work, so
    /// `review` sorts first by default.
    #[serde(default = "default_source_order")]
    pub source_order: Vec<String>,

    /// Quiet period before `watch` rebuilds a dirty source.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_todos_dir() -> PathBuf {
    PathBuf::from("todos")
}

fn default_priority_levels() -> u8 {
    3
}

fn default_id_width() -> usize {
    3
}

fn default_manifest_name() -> String {
    "manifest.json".to_string()
}

fn default_source_order() -> Vec<String> {
    vec!["review".to_string(), "audit".to_string(), "work".to_string()]
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            todos_dir: default_todos_dir(),
            priority_levels: default_priority_levels(),
            id_width: default_id_width(),
            max_wave_width: None,
            sort_strategy: SortStrategy::default(),
            manifest_name: default_manifest_name(),
            source_order: default_source_order(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

/// `[source.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    /// Key looked up in `source_order`; defaults to the source name.
    #[serde(default)]
    pub class: Option<String>,
}

/// Validated configuration. Only obtainable through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub source: BTreeMap<String, SourceConfig>,
    base_dir: PathBuf,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        config: ConfigSection,
        source: BTreeMap<String, SourceConfig>,
    ) -> Self {
        Self {
            config,
            source,
            base_dir: PathBuf::from("."),
        }
    }

    /// Resolve relative paths (`todos_dir`) against `dir`.
    pub fn with_base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute-or-relative path of the todo tree root.
    pub fn todos_root(&self) -> PathBuf {
        self.base_dir.join(&self.config.todos_dir)
    }

    /// Tie-break rank of a source: position of its class in `source_order`,
    /// unlisted classes after all listed ones.
    pub fn source_rank(&self, source: &str) -> usize {
        let class = self
            .source
            .get(source)
            .and_then(|s| s.class.as_deref())
            .unwrap_or(source);
        self.config
            .source_order
            .iter()
            .position(|c| c == class)
            .unwrap_or(self.config.source_order.len())
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ConfigSection::default(), BTreeMap::new())
    }
}
