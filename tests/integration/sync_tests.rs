use std::fs;

use photosort::error::ExitCode;
use photosort::store::{sync, MappingStore};

use super::common::{arg, run, Workspace};

fn ingest_two(ws: &Workspace) {
    ws.source("IMG_20190704_200000.jpg", b"fireworks");
    ws.source("IMG_20190704_200000_1.jpg", b"more fireworks");
    run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "--permanent"]).unwrap();
}

#[test]
fn test_sync_drops_entries_for_deleted_files() {
    let ws = Workspace::new();
    ingest_two(&ws);
    fs::remove_file(ws.dst.join("2019/20190704_200000_001.jpg")).unwrap();

    let report = sync(&ws.dst, "files.txt", false).unwrap();

    assert_eq!(report.files_in_folder, 1);
    assert_eq!(report.entries_in_store, 2);
    assert_eq!(report.removed.len(), 1);
    assert!(report.removed[0].ends_with("IMG_20190704_200000_1.jpg"));

    let store = MappingStore::load(ws.dst.join("files.txt")).unwrap();
    assert_eq!(store.len(), 1);
}

#[test]
fn test_sync_dry_run_keeps_the_store() {
    let ws = Workspace::new();
    ingest_two(&ws);
    fs::remove_file(ws.dst.join("2019/20190704_200000_000.jpg")).unwrap();
    let before = fs::read_to_string(ws.dst.join("files.txt")).unwrap();

    let code = run(&["-q", "sync", arg(&ws.dst), "--dry-run"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert_eq!(fs::read_to_string(ws.dst.join("files.txt")).unwrap(), before);
}

#[test]
fn test_sync_reports_unknown_files_without_adding_them() {
    let ws = Workspace::new();
    ingest_two(&ws);
    ws.library("2019/20190704_200000_007.jpg", b"copied in by hand");

    let report = sync(&ws.dst, "files.txt", false).unwrap();

    assert!(report.missing_in_db.contains("20190704_200000_007.jpg"));
    assert!(report.removed.is_empty());
    assert_eq!(MappingStore::load(ws.dst.join("files.txt")).unwrap().len(), 2);
}

#[test]
fn test_sync_then_ingest_reuses_freed_suffix() {
    let ws = Workspace::new();
    ingest_two(&ws);
    fs::remove_file(ws.dst.join("2019/20190704_200000_001.jpg")).unwrap();
    run(&["-q", "sync", arg(&ws.dst)]).unwrap();

    ws.source("IMG_20190704_200000_9.jpg", b"late arrival");
    run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "--permanent"]).unwrap();

    assert!(ws.dst.join("2019/20190704_200000_001.jpg").exists());
}
