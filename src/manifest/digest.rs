// src/manifest/digest.rs

use blake3::Hasher;

use crate::store::Item;

/// Stable digest over everything a rebuild depends on: ids, priorities,
/// statuses, dependencies and related links. Paths, titles and bodies are
/// not included.
///
/// Used to tell whether a manifest whose dirty signal is clear still
/// matches the items on disk.
pub fn items_digest(items: &[Item]) -> String {
    let mut sorted: Vec<&Item> = items.iter().collect();
    sorted.sort_by(|a, b| a.qualified_id.cmp(&b.qualified_id));

    let mut hasher = Hasher::new();
    for item in sorted {
        hasher.update(item.qualified_id.to_string().as_bytes());
        hasher.update(b"\x1f");
        hasher.update(item.priority.to_string().as_bytes());
        hasher.update(b"\x1f");
        hasher.update(item.status.as_str().as_bytes());
        for dep in &item.dependencies {
            hasher.update(b"\x1fd:");
            hasher.update(dep.to_string().as_bytes());
        }
        for rel in &item.related {
            hasher.update(b"\x1fr:");
            hasher.update(rel.to_string().as_bytes());
        }
        hasher.update(b"\n");
    }
    hasher.finalize().to_hex().to_string()
}
