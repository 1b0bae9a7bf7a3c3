// Rebuilds against a real temp directory.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use tododag::config::ConfigFile;
use tododag::engine::{build_sources, Freshness, RebuildOutcome, Workspace};
use tododag::fs::{FileSystem, RealFileSystem};
use tododag::manifest::{read_manifest, CROSS_SOURCE_MARKER, DIRTY_MARKER};
use tododag::store::{ItemId, Status};
use tododag::types::SourceState;
use tododag_test_utils::builders::{write_items, ConfigFileBuilder, ItemBuilder};

use crate::common::{init_tracing, qid, qids};

fn worked_example_files() -> Vec<ItemBuilder> {
    vec![
        ItemBuilder::new("001").priority("p1"),
        ItemBuilder::new("002").priority("p2"),
        ItemBuilder::new("003").priority("p2").dep("001"),
        ItemBuilder::new("004").priority("p3").dep("003"),
        ItemBuilder::new("005").priority("p2"),
    ]
}

fn setup(tmp: &TempDir) -> (Arc<Workspace>, ConfigFile) {
    let cfg = ConfigFileBuilder::new().base_dir(tmp.path()).build();
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    (Arc::new(Workspace::new(cfg.clone(), fs)), cfg)
}

fn work_dir(cfg: &ConfigFile) -> std::path::PathBuf {
    cfg.todos_root().join("work")
}

#[test]
fn rebuild_writes_manifest_and_clears_dirty_signal() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let (ws, cfg) = setup(&tmp);
    write_items(&RealFileSystem, &work_dir(&cfg), &worked_example_files());
    fs::write(work_dir(&cfg).join(DIRTY_MARKER), "").unwrap();

    let mut handle = ws.claim("work").unwrap();
    assert_eq!(handle.state(), SourceState::Dirty);

    let outcome = handle.rebuild(false).unwrap();
    let RebuildOutcome::Rebuilt(report) = outcome else {
        panic!("expected a rebuild");
    };
    assert_eq!(handle.state(), SourceState::Clean);
    assert!(!work_dir(&cfg).join(DIRTY_MARKER).exists());
    assert!(!work_dir(&cfg).join("manifest.json.tmp").exists());

    let on_disk = read_manifest(&RealFileSystem, &work_dir(&cfg).join("manifest.json"))
        .unwrap()
        .expect("manifest written");
    assert_eq!(on_disk, report.manifest);
    assert_eq!(
        on_disk.topological_order,
        qids("work", &["001", "002", "005", "003", "004"])
    );
    assert_eq!(on_disk.critical_path, qids("work", &["001", "003", "004"]));
    assert_eq!(on_disk.item_count, 5);
}

#[test]
fn clean_source_is_skipped_unless_forced() {
    let tmp = TempDir::new().unwrap();
    let (ws, cfg) = setup(&tmp);
    write_items(&RealFileSystem, &work_dir(&cfg), &worked_example_files());

    let mut handle = ws.claim("work").unwrap();
    assert!(matches!(handle.rebuild(false).unwrap(), RebuildOutcome::Rebuilt(_)));
    assert!(matches!(handle.rebuild(false).unwrap(), RebuildOutcome::Skipped));
    assert!(matches!(handle.rebuild(true).unwrap(), RebuildOutcome::Rebuilt(_)));
}

#[test]
fn unchanged_items_rebuild_to_identical_manifest_body() {
    let tmp = TempDir::new().unwrap();
    let (ws, cfg) = setup(&tmp);
    write_items(&RealFileSystem, &work_dir(&cfg), &worked_example_files());

    let mut handle = ws.claim("work").unwrap();
    let strip = |path: &Path| {
        let mut v: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        v.as_object_mut().unwrap().remove("generated_at");
        v
    };
    let manifest_path = work_dir(&cfg).join("manifest.json");

    handle.rebuild(true).unwrap();
    let first = strip(&manifest_path);
    handle.rebuild(true).unwrap();
    let second = strip(&manifest_path);
    assert_eq!(first, second);
}

#[test]
fn set_status_marks_dirty_and_rebuild_picks_it_up() {
    let tmp = TempDir::new().unwrap();
    let (ws, cfg) = setup(&tmp);
    write_items(&RealFileSystem, &work_dir(&cfg), &worked_example_files());

    let mut handle = ws.claim("work").unwrap();
    handle.rebuild(false).unwrap();
    let before = read_manifest(&RealFileSystem, &work_dir(&cfg).join("manifest.json"))
        .unwrap()
        .unwrap();

    let previous = handle
        .set_status(&ItemId::parse("3", 3).unwrap(), Status::InProgress)
        .unwrap();
    assert_eq!(previous, Status::Pending);
    assert_eq!(handle.state(), SourceState::Dirty);
    assert!(work_dir(&cfg).join(DIRTY_MARKER).exists());
    assert_eq!(handle.context().freshness().unwrap(), Freshness::Dirty);

    handle.rebuild(false).unwrap();
    let after = read_manifest(&RealFileSystem, &work_dir(&cfg).join("manifest.json"))
        .unwrap()
        .unwrap();
    assert_ne!(before.items_digest, after.items_digest);
    assert_eq!(before.topological_order, after.topological_order);
    assert_eq!(handle.context().freshness().unwrap(), Freshness::Clean);
}

#[test]
fn edits_without_dirty_signal_are_reported_stale() {
    let tmp = TempDir::new().unwrap();
    let (ws, cfg) = setup(&tmp);
    let paths = write_items(&RealFileSystem, &work_dir(&cfg), &worked_example_files());

    let ctx = ws.context("work").unwrap();
    assert_eq!(ctx.freshness().unwrap(), Freshness::Missing);

    ws.claim("work").unwrap().rebuild(false).unwrap();
    assert_eq!(ctx.freshness().unwrap(), Freshness::Clean);

    let text = fs::read_to_string(&paths[4]).unwrap();
    fs::write(&paths[4], text.replace("priority: p2", "priority: p1")).unwrap();
    assert_eq!(ctx.freshness().unwrap(), Freshness::Stale);
}

#[test]
fn cross_source_reference_raises_root_signal() {
    let tmp = TempDir::new().unwrap();
    let (ws, cfg) = setup(&tmp);
    write_items(
        &RealFileSystem,
        &work_dir(&cfg),
        &[ItemBuilder::new("001").dep("review/002"), ItemBuilder::new("002")],
    );

    ws.claim("work").unwrap().rebuild(false).unwrap();

    assert!(cfg.todos_root().join(CROSS_SOURCE_MARKER).exists());
    let manifest = read_manifest(&RealFileSystem, &work_dir(&cfg).join("manifest.json"))
        .unwrap()
        .unwrap();
    assert_eq!(manifest.cross_source_refs, vec![qid("review", "002")]);
    assert!(manifest.warnings.dangling_refs.is_empty());
}

#[test]
fn cycle_is_persisted_not_fatal() {
    let tmp = TempDir::new().unwrap();
    let (ws, cfg) = setup(&tmp);
    write_items(
        &RealFileSystem,
        &work_dir(&cfg),
        &[
            ItemBuilder::new("001").dep("002"),
            ItemBuilder::new("002").dep("001"),
            ItemBuilder::new("003"),
        ],
    );

    ws.claim("work").unwrap().rebuild(false).unwrap();
    let manifest = read_manifest(&RealFileSystem, &work_dir(&cfg).join("manifest.json"))
        .unwrap()
        .unwrap();
    assert!(manifest.has_cycles);
    assert_eq!(manifest.unresolved_deps, qids("work", &["001", "002"]));
    assert_eq!(manifest.cycles, vec![qids("work", &["001", "002"])]);
    assert_eq!(manifest.topological_order, qids("work", &["003"]));
}

#[tokio::test]
async fn build_sources_rebuilds_each_source_independently() {
    init_tracing();
    let tmp = TempDir::new().unwrap();
    let (ws, cfg) = setup(&tmp);
    write_items(&RealFileSystem, &work_dir(&cfg), &worked_example_files());
    write_items(
        &RealFileSystem,
        &cfg.todos_root().join("review"),
        &[ItemBuilder::new("001"), ItemBuilder::new("002").dep("001")],
    );
    // An unreadable item file fails its own source only.
    let audit = cfg.todos_root().join("audit");
    fs::create_dir_all(&audit).unwrap();
    fs::write(audit.join("001-broken.md"), "no frontmatter here\n").unwrap();

    let sources = ws.sources().unwrap();
    assert_eq!(sources, vec!["audit", "review", "work"]);

    let results = build_sources(Arc::clone(&ws), sources, false).await;
    let names: Vec<&str> = results.iter().map(|r| r.source.as_str()).collect();
    assert_eq!(names, vec!["audit", "review", "work"]);

    assert!(results[0].result.is_err());
    assert!(audit.join(DIRTY_MARKER).exists());
    assert!(matches!(results[1].result, Ok(RebuildOutcome::Rebuilt(_))));
    assert!(matches!(results[2].result, Ok(RebuildOutcome::Rebuilt(_))));

    // Handles were released when the tasks finished.
    assert!(!ws.is_claimed("work"));
}
