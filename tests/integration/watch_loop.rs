// Watch filtering, debouncing and the watch runtime loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tododag::engine::{RebuildDebouncer, WatchEvent, WatchRuntime, Workspace};
use tododag::fs::mock::MockFileSystem;
use tododag::fs::FileSystem;
use tododag::manifest::{read_manifest, DIRTY_MARKER};
use tododag::watch::{source_of, ItemPathFilter};
use tododag_test_utils::builders::{write_items, ConfigFileBuilder, ItemBuilder};
use tododag_test_utils::with_timeout;

use crate::common::init_tracing;

#[test]
fn filter_accepts_item_files_only() {
    let filter = ItemPathFilter::new("manifest.json").unwrap();

    assert!(filter.matches("work/001-pending-p1-x.md"));
    assert!(!filter.matches("work/manifest.json"));
    assert!(!filter.matches("work/manifest.json.tmp"));
    assert!(!filter.matches("work/.dirty"));
    assert!(!filter.matches(".cross-source-dirty"));
    assert!(!filter.matches("work/archive/001-x.md"));
    assert!(!filter.matches(".git/001-x.md"));
    assert!(!filter.matches("README.md"));
}

#[test]
fn source_of_takes_the_first_component() {
    assert_eq!(source_of("work/001-x.md"), Some("work"));
    assert_eq!(source_of("001-x.md"), None);
    assert_eq!(source_of("work/sub/001-x.md"), None);
}

#[test]
fn debouncer_waits_for_the_quiet_period() {
    let quiet = Duration::from_millis(100);
    let mut d = RebuildDebouncer::new(quiet);
    let t0 = Instant::now();

    d.note_change("work", t0);
    d.note_change("review", t0 + Duration::from_millis(50));
    assert_eq!(d.next_deadline(), Some(t0 + quiet));

    assert!(d.take_due(t0 + Duration::from_millis(99)).is_empty());

    // A fresh change restarts the window.
    d.note_change("work", t0 + Duration::from_millis(80));
    assert!(d.take_due(t0 + Duration::from_millis(120)).is_empty());

    assert_eq!(
        d.take_due(t0 + Duration::from_millis(200)),
        vec!["review".to_string(), "work".to_string()]
    );
    assert!(d.is_idle());
    assert_eq!(d.next_deadline(), None);
}

#[tokio::test]
async fn runtime_builds_dirty_sources_then_reacts_to_changes() {
    init_tracing();
    let fs = MockFileSystem::new();
    let cfg = ConfigFileBuilder::new().build();
    let dir = cfg.todos_root().join("work");
    write_items(&fs, &dir, &[ItemBuilder::new("001")]);

    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let ws = Arc::new(Workspace::new(cfg, shared));

    // Bring the source to a clean state first.
    ws.claim("work").unwrap().rebuild(false).unwrap();
    let manifest_path = dir.join("manifest.json");
    assert_eq!(read_manifest(&fs, &manifest_path).unwrap().unwrap().item_count, 1);

    // An edit the runtime has not heard about yet.
    let paths = write_items(&fs, &dir, &[ItemBuilder::new("002").dep("001")]);

    let (tx, rx) = mpsc::channel(8);
    tx.send(WatchEvent::ItemChanged {
        source: "work".to_string(),
        path: paths[0].clone(),
    })
    .await
    .unwrap();
    drop(tx);

    let runtime = WatchRuntime::new(Arc::clone(&ws), rx, Duration::ZERO);
    with_timeout(runtime.run()).await.unwrap();

    let manifest = read_manifest(&fs, &manifest_path).unwrap().unwrap();
    assert_eq!(manifest.item_count, 2);
    assert_eq!(manifest.waves.len(), 2);
    assert!(!fs.exists(&dir.join(DIRTY_MARKER)));
    assert!(!ws.is_claimed("work"));
}

#[tokio::test]
async fn runtime_stops_on_shutdown_and_ignores_unknown_sources() {
    let fs = MockFileSystem::new();
    let cfg = ConfigFileBuilder::new().build();
    write_items(&fs, &cfg.todos_root().join("work"), &[ItemBuilder::new("001")]);
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let ws = Arc::new(Workspace::new(cfg, shared));

    let (tx, rx) = mpsc::channel(8);
    tx.send(WatchEvent::ItemChanged {
        source: "ghost".to_string(),
        path: "todos/ghost/001.md".into(),
    })
    .await
    .unwrap();
    tx.send(WatchEvent::Shutdown).await.unwrap();

    let runtime = WatchRuntime::new(Arc::clone(&ws), rx, Duration::from_secs(60));
    with_timeout(runtime.run()).await.unwrap();

    // The initial pass still built the dirty source.
    assert!(fs.exists(&ws.todos_root().join("work").join("manifest.json")));
    drop(tx);
}

#[tokio::test]
async fn runtime_rebuilds_pending_sources_when_the_channel_closes() {
    init_tracing();
    let fs = MockFileSystem::new();
    let cfg = ConfigFileBuilder::new().build();
    let dir = cfg.todos_root().join("work");
    write_items(&fs, &dir, &[ItemBuilder::new("001")]);
    let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
    let ws = Arc::new(Workspace::new(cfg, shared));
    ws.claim("work").unwrap().rebuild(false).unwrap();

    let paths = write_items(
        &fs,
        &dir,
        &[ItemBuilder::new("002").dep("001"), ItemBuilder::new("003").dep("002")],
    );
    let (tx, rx) = mpsc::channel(8);
    tx.send(WatchEvent::ItemChanged {
        source: "work".to_string(),
        path: paths[1].clone(),
    })
    .await
    .unwrap();
    drop(tx);

    // The quiet period never elapses; closing the channel still flushes it.
    let runtime = WatchRuntime::new(Arc::clone(&ws), rx, Duration::from_secs(3600));
    with_timeout(runtime.run()).await.unwrap();

    let manifest = read_manifest(&fs, &dir.join("manifest.json")).unwrap().unwrap();
    assert_eq!(manifest.item_count, 3);
    assert_eq!(manifest.waves.len(), 3);
    assert!(!fs.exists(&dir.join(DIRTY_MARKER)));
    assert!(!ws.is_claimed("work"));
}

#[test]
fn debouncer_take_all_ignores_deadlines() {
    let mut d = RebuildDebouncer::new(Duration::from_secs(60));
    let t0 = Instant::now();
    d.note_change("work", t0);
    d.note_change("review", t0);

    assert!(d.take_due(t0).is_empty());
    assert_eq!(d.take_all(), vec!["review".to_string(), "work".to_string()]);
    assert!(d.is_idle());
}
