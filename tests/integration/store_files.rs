// Item file parsing and in-place edits.

use std::path::{Path, PathBuf};

use tododag::errors::TododagError;
use tododag::fs::mock::MockFileSystem;
use tododag::fs::FileSystem;
use tododag::store::frontmatter::{self, CURRENT_SCHEMA_VERSION};
use tododag::store::mutate::{find_item_file, set_status};
use tododag::store::reader::{discover_sources, is_item_file, read_source};
use tododag::store::{ItemId, Priority, ReaderSettings, Status};

use crate::common::qid;

fn dir() -> PathBuf {
    PathBuf::from("todos/work")
}

#[test]
fn schema_one_file_takes_id_from_filename_and_bare_deps_from_its_source() {
    let fs = MockFileSystem::new();
    fs.add_file(
        dir().join("007-pending-p1-old-style.md"),
        "---\nstatus: ready\npriority: p1\ndependencies: [\"3\", \"review/1\"]\n---\n\n# Old style\n",
    );

    let scan = read_source(&fs, &dir(), "work", ReaderSettings::default()).unwrap();
    assert!(scan.warnings.is_empty(), "{:?}", scan.warnings);
    let item = &scan.items[0];
    assert_eq!(item.qualified_id, qid("work", "7"));
    assert_eq!(item.status, Status::Ready);
    assert_eq!(item.priority, Priority::HIGHEST);
    assert_eq!(
        item.dependencies.iter().cloned().collect::<Vec<_>>(),
        vec![qid("review", "1"), qid("work", "3")]
    );
    assert_eq!(item.title.as_deref(), Some("Old style"));
}

#[test]
fn numeric_issue_id_and_priority_are_normalized() {
    let fs = MockFileSystem::new();
    fs.add_file(
        dir().join("12-x.md"),
        "---\nschema_version: 2\nissue_id: 12\nsource: work\nstatus: pending\npriority: 3\ndepends_on: [4]\n---\n",
    );

    let scan = read_source(&fs, &dir(), "work", ReaderSettings::default()).unwrap();
    let item = &scan.items[0];
    assert_eq!(item.id().as_str(), "012");
    assert_eq!(item.priority.level(), 3);
    assert!(item.dependencies.contains(&qid("work", "004")));
}

#[test]
fn non_item_files_are_ignored() {
    for name in ["manifest.json", ".dirty", "001-x.md.tmp", "notes.md", "README.md"] {
        assert!(!is_item_file(Path::new(name)), "{name}");
    }
    assert!(is_item_file(Path::new("001-pending-p2-fix.md")));
    assert!(is_item_file(Path::new("001.md")));
}

#[test]
fn duplicate_ids_keep_the_first_file_and_warn() {
    let fs = MockFileSystem::new();
    let body = "---\nstatus: pending\npriority: p2\n---\n";
    fs.add_file(dir().join("001-a.md"), body);
    fs.add_file(dir().join("001-b.md"), body);

    let scan = read_source(&fs, &dir(), "work", ReaderSettings::default()).unwrap();
    assert_eq!(scan.items.len(), 1);
    assert_eq!(scan.items[0].path, dir().join("001-a.md"));
    assert_eq!(scan.warnings.len(), 1);
    assert!(scan.warnings[0].message.contains("duplicate id"));
}

#[test]
fn mismatched_source_and_malformed_refs_are_warnings() {
    let fs = MockFileSystem::new();
    fs.add_file(
        dir().join("001-a.md"),
        "---\nissue_id: \"001\"\nsource: review\nstatus: pending\npriority: p2\ndependencies: [\"abc\"]\n---\n",
    );

    let scan = read_source(&fs, &dir(), "work", ReaderSettings::default()).unwrap();
    assert_eq!(scan.items[0].qualified_id, qid("work", "1"));
    assert!(scan.items[0].dependencies.is_empty());
    assert_eq!(scan.warnings.len(), 2);
}

#[test]
fn broken_frontmatter_is_a_hard_error() {
    let fs = MockFileSystem::new();
    fs.add_file(dir().join("001-a.md"), "---\nstatus: pending\npriority: p9\n---\n");

    let err = read_source(&fs, &dir(), "work", ReaderSettings::default()).unwrap_err();
    match err {
        TododagError::ItemParse { path, message } => {
            assert_eq!(path, dir().join("001-a.md"));
            assert!(message.contains("p9"), "{message}");
        }
        other => panic!("expected ItemParse, got {other:?}"),
    }
}

#[test]
fn configured_priority_levels_widen_the_accepted_range() {
    let fs = MockFileSystem::new();
    fs.add_file(dir().join("001-a.md"), "---\nstatus: pending\npriority: p5\n---\n");

    let settings = ReaderSettings {
        id_width: 4,
        priority_levels: 5,
    };
    let scan = read_source(&fs, &dir(), "work", settings).unwrap();
    assert_eq!(scan.items[0].id().as_str(), "0001");
    assert_eq!(scan.items[0].priority.level(), 5);
}

#[test]
fn discover_sources_lists_directories_only() {
    let fs = MockFileSystem::new();
    fs.add_dir("todos/work");
    fs.add_dir("todos/review");
    fs.add_dir("todos/.archive");
    fs.add_file("todos/.cross-source-dirty", "");

    assert_eq!(
        discover_sources(&fs, Path::new("todos")).unwrap(),
        vec!["review", "work"]
    );
    assert!(discover_sources(&fs, Path::new("missing")).unwrap().is_empty());
}

#[test]
fn set_status_upgrades_schema_and_preserves_the_rest() {
    let fs = MockFileSystem::new();
    let path = dir().join("003-pending-p2-thing.md");
    fs.add_file(
        &path,
        "---\nstatus: pending\npriority: p2\nowner: sam\ntags: [a, b]\n---\n\n# Thing\n\nBody text.\n",
    );

    let id = ItemId::parse("3", 3).unwrap();
    let found = find_item_file(&fs, &dir(), "work", &id, ReaderSettings::default()).unwrap();
    assert_eq!(found, path);

    let previous = set_status(&fs, &path, "work", &id, Status::Complete).unwrap();
    assert_eq!(previous, Status::Pending);

    let text = fs.read_to_string(&path).unwrap();
    let (fm, body) = frontmatter::parse(&text).unwrap();
    assert_eq!(fm.schema_version, CURRENT_SCHEMA_VERSION);
    assert_eq!(fm.status, Status::Complete);
    assert_eq!(fm.source.as_deref(), Some("work"));
    assert_eq!(fm.issue_id.map(|s| s.to_string()), Some("003".to_string()));
    assert!(fm.extra.contains_key("owner"));
    assert!(fm.extra.contains_key("tags"));
    assert_eq!(body, "\n# Thing\n\nBody text.\n");
}

#[test]
fn find_item_file_skips_unrelated_broken_files() {
    let fs = MockFileSystem::new();
    fs.add_file(dir().join("001-pending-p1-broken.md"), "no frontmatter here\n");
    let good = dir().join("002-pending-p2-fine.md");
    fs.add_file(&good, "---\nstatus: pending\npriority: p2\n---\n\n# Fine\n");

    let id = ItemId::parse("2", 3).unwrap();
    let found = find_item_file(&fs, &dir(), "work", &id, ReaderSettings::default()).unwrap();
    assert_eq!(found, good);

    let missing = ItemId::parse("9", 3).unwrap();
    let err = find_item_file(&fs, &dir(), "work", &missing, ReaderSettings::default()).unwrap_err();
    assert!(matches!(err, TododagError::ItemNotFound(_)), "{err:?}");
}
