#![allow(dead_code)]

use std::collections::BTreeSet;
use std::path::PathBuf;

use tododag::store::{Item, ItemId, Priority, QualifiedId, Status};

pub use tododag_test_utils::init_tracing;

pub const ID_WIDTH: usize = 3;

/// `qid("work", "3")` -> `work/003`.
pub fn qid(source: &str, id: &str) -> QualifiedId {
    QualifiedId::new(source, ItemId::parse(id, ID_WIDTH).expect("numeric id"))
}

pub fn qids(source: &str, ids: &[&str]) -> Vec<QualifiedId> {
    ids.iter().map(|id| qid(source, id)).collect()
}

/// In-memory item; `deps` may be bare (`"002"`) or qualified (`"review/002"`).
pub fn item(source: &str, id: &str, priority: u8, deps: &[&str]) -> Item {
    let dependencies: BTreeSet<QualifiedId> = deps
        .iter()
        .map(|d| QualifiedId::parse(d, source, ID_WIDTH).expect("valid reference"))
        .collect();
    let qualified_id = qid(source, id);
    Item {
        path: PathBuf::from(format!("{source}/{}.md", qualified_id.id)),
        qualified_id,
        priority: Priority::new(priority).expect("priority >= 1"),
        status: Status::Pending,
        dependencies,
        related: BTreeSet::new(),
        title: None,
    }
}

/// A(p1), B(p2), C(p2, deps A), D(p3, deps C), E(p2) as ids 001..005.
pub fn worked_example() -> Vec<Item> {
    vec![
        item("work", "001", 1, &[]),
        item("work", "002", 2, &[]),
        item("work", "003", 2, &["001"]),
        item("work", "004", 3, &["003"]),
        item("work", "005", 2, &[]),
    ]
}
