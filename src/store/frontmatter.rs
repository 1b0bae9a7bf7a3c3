// src/store/frontmatter.rs

//! YAML frontmatter of item files.
//!
//! Older item files (schema 1) omit `issue_id` and `source` and use bare
//! dependency ids; every such field has an explicit default here so callers
//! never look keys up by string.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::store::item::Status;

/// Schema written by this crate.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

fn default_schema_version() -> u32 {
    1
}

/// A YAML scalar that may be written quoted or bare (`issue_id: 003` parses
/// as a number, `issue_id: "003"` as a string).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(u64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frontmatter {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    pub status: Status,

    pub priority: Scalar,

    /// Absent in schema 1; the numeric filename prefix is used instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_id: Option<Scalar>,

    /// Absent in schema 1; the containing directory is used instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, alias = "depends_on")]
    pub dependencies: Vec<Scalar>,

    #[serde(default, alias = "related")]
    pub related_todos: Vec<Scalar>,

    /// Every other key (timestamps, owners, tags, ...), kept verbatim so a
    /// rewrite does not drop data.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Split `---\n<yaml>\n---\n<body>` into its two halves.
///
/// Returns `None` when the text does not open with a frontmatter fence or
/// the closing fence is missing.
pub fn split(text: &str) -> Option<(&str, &str)> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let rest = text
        .strip_prefix("---\n")
        .or_else(|| text.strip_prefix("---\r\n"))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// Parse the frontmatter block of an item file.
pub fn parse(text: &str) -> Result<(Frontmatter, &str), String> {
    let (yaml, body) = split(text).ok_or_else(|| {
        "missing or unterminated frontmatter (expected leading and closing '---' lines)"
            .to_string()
    })?;
    let fm: Frontmatter = serde_yaml::from_str(yaml).map_err(|e| e.to_string())?;
    Ok((fm, body))
}

/// Render frontmatter plus body back into item-file text.
pub fn render(fm: &Frontmatter, body: &str) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(fm)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str("---\n");
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str("---\n");
    out.push_str(body);
    Ok(out)
}

/// First markdown `# ` heading of the body, if any.
pub fn heading(body: &str) -> Option<String> {
    body.lines()
        .map(str::trim)
        .find_map(|l| l.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
