// src/store/item.rs

//! Typed todo records and their identifiers.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Numeric, zero-padded item id, unique within a source (e.g. `"007"`).
///
/// Ordering is numeric: `"999" < "1000"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ItemId(String);

impl ItemId {
    /// Parse and normalize a raw id: digits only, leading zeros stripped and
    /// re-padded to `width`. `"3"`, `"003"` and `"0003"` all become `"003"`
    /// for width 3.
    pub fn parse(raw: &str, width: usize) -> Option<ItemId> {
        let raw = raw.trim();
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = raw.trim_start_matches('0');
        let digits = if trimmed.is_empty() { "0" } else { trimmed };
        Some(ItemId(format!("{:0>width$}", digits, width = width)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for ItemId {
    fn cmp(&self, other: &Self) -> Ordering {
        // Normalized ids never carry extra leading zeros, so a longer id is a
        // larger number.
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ItemId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Globally unique `{source}/{id}` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedId {
    pub source: String,
    pub id: ItemId,
}

impl QualifiedId {
    pub fn new(source: impl Into<String>, id: ItemId) -> Self {
        Self {
            source: source.into(),
            id,
        }
    }

    /// Parse a dependency reference as written in frontmatter.
    ///
    /// `"review/002"` is taken as-is; a bare `"002"` belongs to
    /// `default_source` (older item files only used bare ids).
    pub fn parse(raw: &str, default_source: &str, width: usize) -> Result<QualifiedId, String> {
        let raw = raw.trim();
        let (source, id) = match raw.split_once('/') {
            Some((source, id)) => (source.trim(), id.trim()),
            None => (default_source, raw),
        };
        if source.is_empty() || id.contains('/') {
            return Err(format!("malformed reference '{raw}' (expected SOURCE/ID or ID)"));
        }
        let id = ItemId::parse(id, width)
            .ok_or_else(|| format!("malformed reference '{raw}' (id must be numeric)"))?;
        Ok(QualifiedId::new(source, id))
    }

    pub fn is_in(&self, source: &str) -> bool {
        self.source == source
    }
}

impl fmt::Display for QualifiedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.source, self.id)
    }
}

impl Serialize for QualifiedId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for QualifiedId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let (source, id) = raw
            .split_once('/')
            .ok_or_else(|| serde::de::Error::custom(format!("not a qualified id: {raw}")))?;
        // Keep the id exactly as persisted; width is a property of the writer.
        let id = ItemId::parse(id, id.len())
            .ok_or_else(|| serde::de::Error::custom(format!("not a numeric id: {raw}")))?;
        Ok(QualifiedId::new(source, id))
    }
}

/// Priority class; `1` is the highest. The number of classes is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Priority(u8);

impl Priority {
    pub const HIGHEST: Priority = Priority(1);

    /// Accepts `p1`..`pN`, bare `1`..`N`, and `high` / `medium` / `low`.
    pub fn parse(raw: &str, levels: u8) -> Result<Priority, String> {
        let s = raw.trim().to_lowercase();
        let n: Option<u8> = match s.as_str() {
            "high" | "critical" => Some(1),
            "medium" | "normal" => Some(2),
            "low" => Some(3),
            other => other.strip_prefix('p').unwrap_or(other).parse().ok(),
        };
        match n {
            Some(n) if (1..=levels).contains(&n) => Ok(Priority(n)),
            _ => Err(format!(
                "invalid priority '{raw}' (expected p1..p{levels})"
            )),
        }
    }

    pub fn new(level: u8) -> Option<Priority> {
        (level >= 1).then_some(Priority(level))
    }

    pub fn level(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.0)
    }
}

/// Lifecycle state of an item. Carried through but never consulted by the
/// graph algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Ready,
    #[serde(alias = "in-progress")]
    InProgress,
    #[serde(alias = "done")]
    Complete,
    Blocked,
    #[serde(alias = "wont-fix")]
    WontFix,
    Interrupted,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Ready => "ready",
            Status::InProgress => "in_progress",
            Status::Complete => "complete",
            Status::Blocked => "blocked",
            Status::WontFix => "wont_fix",
            Status::Interrupted => "interrupted",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(Status::Pending),
            "ready" => Ok(Status::Ready),
            "in_progress" => Ok(Status::InProgress),
            "complete" | "done" => Ok(Status::Complete),
            "blocked" => Ok(Status::Blocked),
            "wont_fix" => Ok(Status::WontFix),
            "interrupted" => Ok(Status::Interrupted),
            other => Err(format!("invalid status: {other}")),
        }
    }
}

/// One todo, as read from its item file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub qualified_id: QualifiedId,
    pub priority: Priority,
    pub status: Status,
    /// Items this one is blocked by; may point into other sources.
    pub dependencies: BTreeSet<QualifiedId>,
    /// Informational links; never graph edges.
    pub related: BTreeSet<QualifiedId>,
    pub title: Option<String>,
    pub path: PathBuf,
}

impl Item {
    pub fn id(&self) -> &ItemId {
        &self.qualified_id.id
    }

    pub fn source(&self) -> &str {
        &self.qualified_id.source
    }
}
