// Single-writer handles and failure handling, on the in-memory filesystem.

use std::path::PathBuf;
use std::sync::Arc;

use tododag::config::ConfigFile;
use tododag::engine::{RebuildOutcome, Workspace};
use tododag::errors::TododagError;
use tododag::fs::mock::MockFileSystem;
use tododag::fs::FileSystem;
use tododag::manifest::DIRTY_MARKER;
use tododag::store::{ItemId, Status};
use tododag::types::SourceState;
use tododag_test_utils::builders::{write_items, ConfigFileBuilder, ItemBuilder};

use crate::common::init_tracing;

struct Fixture {
    fs: MockFileSystem,
    ws: Workspace,
    cfg: ConfigFile,
}

impl Fixture {
    fn new() -> Self {
        let fs = MockFileSystem::new();
        let cfg = ConfigFileBuilder::new().build();
        let shared: Arc<dyn FileSystem> = Arc::new(fs.clone());
        let ws = Workspace::new(cfg.clone(), shared);
        let fixture = Self { fs, ws, cfg };
        write_items(
            &fixture.fs,
            &fixture.dir(),
            &[ItemBuilder::new("001").priority("p1"), ItemBuilder::new("002").dep("001")],
        );
        fixture
    }

    fn dir(&self) -> PathBuf {
        self.cfg.todos_root().join("work")
    }

    fn manifest(&self) -> PathBuf {
        self.dir().join("manifest.json")
    }
}

#[test]
fn second_claim_is_refused_until_the_first_is_dropped() {
    let f = Fixture::new();

    let first = f.ws.claim("work").unwrap();
    assert!(f.ws.is_claimed("work"));
    match f.ws.claim("work") {
        Err(TododagError::SourceBusy(s)) => assert_eq!(s, "work"),
        other => panic!("expected SourceBusy, got {other:?}"),
    }

    drop(first);
    assert!(!f.ws.is_claimed("work"));
    assert!(f.ws.claim("work").is_ok());
}

#[test]
fn unknown_or_invalid_sources_are_not_found() {
    let f = Fixture::new();

    assert!(matches!(f.ws.claim("nope"), Err(TododagError::SourceNotFound(_))));
    assert!(matches!(f.ws.context("../etc"), Err(TododagError::SourceNotFound(_))));
}

#[test]
fn failed_rename_leaves_source_dirty_and_no_partial_manifest() {
    init_tracing();
    let f = Fixture::new();
    f.fs.deny_rename(f.manifest());

    let mut handle = f.ws.claim("work").unwrap();
    let err = handle.rebuild(false).unwrap_err();
    assert!(err.to_string().contains("manifest.json"), "unexpected error: {err}");

    assert_eq!(handle.state(), SourceState::Dirty);
    assert!(f.fs.exists(&f.dir().join(DIRTY_MARKER)));
    assert!(!f.fs.exists(&f.manifest()));
    assert!(!f.fs.exists(&f.dir().join("manifest.json.tmp")));
}

#[test]
fn failed_rename_keeps_previous_manifest_intact() {
    let f = Fixture::new();

    let mut handle = f.ws.claim("work").unwrap();
    handle.rebuild(false).unwrap();
    let good = f.fs.contents(f.manifest()).unwrap();

    f.fs.deny_rename(f.manifest());
    handle.mark_dirty().unwrap();
    assert!(handle.rebuild(false).is_err());

    assert_eq!(f.fs.contents(f.manifest()).unwrap(), good);
    assert!(f.fs.exists(&f.dir().join(DIRTY_MARKER)));
}

#[test]
fn failed_temp_write_is_an_error() {
    let f = Fixture::new();
    f.fs.deny_write(f.dir().join("manifest.json.tmp"));

    let mut handle = f.ws.claim("work").unwrap();
    assert!(handle.rebuild(false).is_err());
    assert_eq!(handle.state(), SourceState::Dirty);
}

#[test]
fn dirty_signal_survives_across_handles() {
    let f = Fixture::new();

    {
        let mut handle = f.ws.claim("work").unwrap();
        assert!(matches!(handle.rebuild(false).unwrap(), RebuildOutcome::Rebuilt(_)));
        assert_eq!(handle.state(), SourceState::Clean);
    }
    {
        let mut handle = f.ws.claim("work").unwrap();
        assert_eq!(handle.state(), SourceState::Clean);
        handle.mark_dirty().unwrap();
        // Idempotent.
        handle.mark_dirty().unwrap();
    }
    let handle = f.ws.claim("work").unwrap();
    assert_eq!(handle.state(), SourceState::Dirty);
}

#[test]
fn set_status_on_missing_item_changes_nothing() {
    let f = Fixture::new();
    let mut handle = f.ws.claim("work").unwrap();
    handle.rebuild(false).unwrap();

    let err = handle
        .set_status(&ItemId::parse("42", 3).unwrap(), Status::Complete)
        .unwrap_err();
    assert!(matches!(err, TododagError::ItemNotFound(ref s) if s == "work/042"));
    assert_eq!(handle.state(), SourceState::Clean);
    assert!(!f.fs.exists(&f.dir().join(DIRTY_MARKER)));
}
