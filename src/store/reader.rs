// src/store/reader.rs

//! Scan a source directory and turn its item files into [`Item`]s.
//!
//! Filenames (`<id>-<status>-<priority>-<slug>.md`) encode the state at
//! creation time only; the reader trusts frontmatter and falls back to the
//! filename solely for the id of schema-1 files.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::errors::{Result, TododagError};
use crate::fs::FileSystem;
use crate::store::frontmatter::{self, Scalar};
use crate::store::item::{Item, ItemId, Priority, QualifiedId};

static ITEM_FILE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<id>\d{1,9})(?:-[^/\\]*)?\.md$").expect("item file regex is valid")
});

/// Settings that affect how ids and priorities are interpreted.
#[derive(Debug, Clone, Copy)]
pub struct ReaderSettings {
    pub id_width: usize,
    pub priority_levels: u8,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            id_width: 3,
            priority_levels: 3,
        }
    }
}

/// A recoverable problem found while reading item files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Everything read from one source directory.
#[derive(Debug, Clone, Default)]
pub struct SourceScan {
    pub source: String,
    /// Sorted by id.
    pub items: Vec<Item>,
    pub warnings: Vec<ReadWarning>,
}

/// True for `<digits>[-anything].md`; dotfiles, manifests and temp files
/// are not items.
pub fn is_item_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|name| ITEM_FILE_RE.is_match(name))
}

fn filename_id(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    ITEM_FILE_RE
        .captures(name)
        .map(|c| c["id"].to_string())
}

/// List source directory names under the todos root, sorted.
///
/// A missing root means "no sources yet", not an error.
pub fn discover_sources(fs: &dyn FileSystem, todos_root: &Path) -> Result<Vec<String>> {
    if !fs.is_dir(todos_root) {
        debug!(root = ?todos_root, "todos root does not exist; no sources");
        return Ok(Vec::new());
    }
    let mut sources: Vec<String> = fs
        .read_dir(todos_root)?
        .into_iter()
        .filter(|p| fs.is_dir(p))
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();
    sources.sort();
    Ok(sources)
}

/// Read every item file of `source` in `source_dir`.
///
/// Unreadable or unparseable files are hard errors (the caller must not
/// build a manifest from a partial item set); softer problems become
/// [`ReadWarning`]s.
pub fn read_source(
    fs: &dyn FileSystem,
    source_dir: &Path,
    source: &str,
    settings: ReaderSettings,
) -> Result<SourceScan> {
    let mut scan = SourceScan {
        source: source.to_string(),
        ..SourceScan::default()
    };

    if !fs.is_dir(source_dir) {
        return Err(TododagError::SourceNotFound(format!(
            "{source} (no directory at {:?})",
            source_dir
        )));
    }

    let mut paths: Vec<PathBuf> = fs
        .read_dir(source_dir)?
        .into_iter()
        .filter(|p| is_item_file(p) && fs.is_file(p))
        .collect();
    paths.sort();

    let mut seen: HashMap<ItemId, PathBuf> = HashMap::new();

    for path in paths {
        let text = fs.read_to_string(&path)?;
        let item = parse_item(&text, &path, source, settings, &mut scan.warnings)?;

        if let Some(first) = seen.get(item.id()) {
            warn!(source, id = %item.id(), ?path, "duplicate item id; ignoring file");
            scan.warnings.push(ReadWarning {
                path: path.clone(),
                message: format!(
                    "duplicate id {} (already defined by {:?}); file ignored",
                    item.qualified_id, first
                ),
            });
            continue;
        }
        seen.insert(item.id().clone(), path);
        scan.items.push(item);
    }

    scan.items.sort_by(|a, b| a.qualified_id.cmp(&b.qualified_id));
    debug!(
        source,
        items = scan.items.len(),
        warnings = scan.warnings.len(),
        "read source"
    );
    Ok(scan)
}

/// Parse one item file.
pub fn parse_item(
    text: &str,
    path: &Path,
    source: &str,
    settings: ReaderSettings,
    warnings: &mut Vec<ReadWarning>,
) -> Result<Item> {
    let (fm, body) =
        frontmatter::parse(text).map_err(|msg| TododagError::item_parse(path, msg))?;

    let raw_id = match &fm.issue_id {
        Some(id) => id.to_string(),
        None => filename_id(path).ok_or_else(|| {
            TododagError::item_parse(path, "no issue_id in frontmatter and no numeric filename prefix")
        })?,
    };
    let id = ItemId::parse(&raw_id, settings.id_width).ok_or_else(|| {
        TododagError::item_parse(path, format!("issue_id '{raw_id}' is not numeric"))
    })?;

    let priority = Priority::parse(&fm.priority.to_string(), settings.priority_levels)
        .map_err(|msg| TododagError::item_parse(path, msg))?;

    if let Some(declared) = fm.source.as_deref() {
        if declared != source {
            warnings.push(ReadWarning {
                path: path.to_path_buf(),
                message: format!(
                    "frontmatter source '{declared}' does not match directory '{source}'; using '{source}'"
                ),
            });
        }
    }

    let dependencies = parse_refs(&fm.dependencies, "dependency", path, source, settings, warnings);
    let related = parse_refs(&fm.related_todos, "related", path, source, settings, warnings);

    Ok(Item {
        qualified_id: QualifiedId::new(source, id),
        priority,
        status: fm.status,
        dependencies,
        related,
        title: fm.title.clone().or_else(|| frontmatter::heading(body)),
        path: path.to_path_buf(),
    })
}

fn parse_refs(
    raw: &[Scalar],
    kind: &str,
    path: &Path,
    source: &str,
    settings: ReaderSettings,
    warnings: &mut Vec<ReadWarning>,
) -> BTreeSet<QualifiedId> {
    let mut out = BTreeSet::new();
    for r in raw {
        match QualifiedId::parse(&r.to_string(), source, settings.id_width) {
            Ok(q) => {
                out.insert(q);
            }
            Err(msg) => warnings.push(ReadWarning {
                path: path.to_path_buf(),
                message: format!("{kind} ignored: {msg}"),
            }),
        }
    }
    out
}
