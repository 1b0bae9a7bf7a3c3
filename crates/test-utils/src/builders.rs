#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tododag::config::{ConfigFile, ConfigSection, RawConfigFile, SourceConfig};
use tododag::fs::FileSystem;
use tododag::types::SortStrategy;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
    base_dir: PathBuf,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                config: ConfigSection::default(),
                source: BTreeMap::new(),
            },
            base_dir: PathBuf::from("."),
        }
    }

    /// Directory that `todos_dir` is resolved against.
    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = dir.into();
        self
    }

    pub fn todos_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.config.todos_dir = dir.into();
        self
    }

    pub fn max_wave_width(mut self, width: usize) -> Self {
        self.config.config.max_wave_width = Some(width);
        self
    }

    pub fn sort_strategy(mut self, strategy: SortStrategy) -> Self {
        self.config.config.sort_strategy = strategy;
        self
    }

    pub fn priority_levels(mut self, levels: u8) -> Self {
        self.config.config.priority_levels = levels;
        self
    }

    pub fn source_class(mut self, source: &str, class: &str) -> Self {
        self.config.source.insert(
            source.to_string(),
            SourceConfig {
                class: Some(class.to_string()),
            },
        );
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config)
            .expect("Failed to build valid config from builder")
            .with_base_dir(self.base_dir)
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for one item file.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    id: String,
    status: String,
    priority: String,
    source: Option<String>,
    deps: Vec<String>,
    related: Vec<String>,
    title: String,
    legacy: bool,
}

impl ItemBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            status: "pending".to_string(),
            priority: "p2".to_string(),
            source: None,
            deps: Vec::new(),
            related: Vec::new(),
            title: format!("Item {id}"),
            legacy: false,
        }
    }

    pub fn priority(mut self, p: &str) -> Self {
        self.priority = p.to_string();
        self
    }

    pub fn status(mut self, s: &str) -> Self {
        self.status = s.to_string();
        self
    }

    /// Write `source:` into the frontmatter (schema 2 files only).
    pub fn source(mut self, s: &str) -> Self {
        self.source = Some(s.to_string());
        self
    }

    pub fn dep(mut self, d: &str) -> Self {
        self.deps.push(d.to_string());
        self
    }

    pub fn related(mut self, r: &str) -> Self {
        self.related.push(r.to_string());
        self
    }

    pub fn title(mut self, t: &str) -> Self {
        self.title = t.to_string();
        self
    }

    /// Emit a schema-1 file: no `schema_version`, `issue_id` or `source`.
    pub fn legacy(mut self) -> Self {
        self.legacy = true;
        self
    }

    /// `<id>-<status>-<priority>-<slug>.md`
    pub fn file_name(&self) -> String {
        let slug: String = self
            .title
            .to_lowercase()
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
            .collect();
        format!("{}-{}-{}-{}.md", self.id, self.status, self.priority, slug)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        if !self.legacy {
            out.push_str("schema_version: 2\n");
            out.push_str(&format!("issue_id: \"{}\"\n", self.id));
            if let Some(s) = &self.source {
                out.push_str(&format!("source: {s}\n"));
            }
        }
        out.push_str(&format!("status: {}\n", self.status));
        out.push_str(&format!("priority: {}\n", self.priority));
        out.push_str(&yaml_list("dependencies", &self.deps));
        out.push_str(&yaml_list("related_todos", &self.related));
        out.push_str("---\n\n");
        out.push_str(&format!("# {}\n\nDetails.\n", self.title));
        out
    }
}

fn yaml_list(key: &str, values: &[String]) -> String {
    if values.is_empty() {
        return format!("{key}: []\n");
    }
    let mut out = format!("{key}:\n");
    for v in values {
        out.push_str(&format!("  - \"{v}\"\n"));
    }
    out
}

/// Write `items` as files into `source_dir`, returning their paths.
pub fn write_items(fs: &dyn FileSystem, source_dir: &Path, items: &[ItemBuilder]) -> Vec<PathBuf> {
    fs.create_dir_all(source_dir)
        .expect("failed to create source dir");
    items
        .iter()
        .map(|item| {
            let path = source_dir.join(item.file_name());
            fs.write(&path, item.render().as_bytes())
                .expect("failed to write item file");
            path
        })
        .collect()
}
