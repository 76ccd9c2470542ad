use photosort::error::ExitCode;
use photosort::store::{reorganize, MappingStore};

use super::common::{arg, run, Workspace};

#[test]
fn test_switch_library_to_month_folders() {
    let ws = Workspace::new();
    let source = ws.source("IMG_20180512_171500.jpg", b"may");
    run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "--permanent"]).unwrap();
    assert!(ws.dst.join("2018/20180512_171500_000.jpg").exists());

    let code = run(&["-q", "organize", arg(&ws.dst), "--by-month"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    let moved = ws.dst.join("2018/05/20180512_171500_000.jpg");
    assert!(moved.exists());
    assert!(!ws.dst.join("2018/20180512_171500_000.jpg").exists());

    let store = MappingStore::load(ws.dst.join("files.txt")).unwrap();
    assert_eq!(
        store.get(&source.to_string_lossy()).map(str::to_string),
        Some(moved.to_string_lossy().into_owned())
    );
}

#[test]
fn test_ingest_after_organize_continues_suffixes() {
    let ws = Workspace::new();
    ws.library("20180512_171500_000.jpg", b"loose");
    reorganize(&ws.dst, "files.txt", true, false).unwrap();

    ws.source("IMG_20180512_171500.jpg", b"another");
    run(&[
        "-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "--by-month", "--permanent",
    ])
    .unwrap();

    assert!(ws.dst.join("2018/05/20180512_171500_000.jpg").exists());
    assert!(ws.dst.join("2018/05/20180512_171500_001.jpg").exists());
}

#[test]
fn test_organize_leaves_non_canonical_files() {
    let ws = Workspace::new();
    let odd = ws.library("notes.txt", b"keep me");
    let loose = ws.library("20200202_020202_000.mp4", b"clip");

    let report = reorganize(&ws.dst, "files.txt", false, false).unwrap();

    assert_eq!(report.moved, vec![(loose, ws.dst.join("2020/20200202_020202_000.mp4"))]);
    assert!(odd.exists());
}

#[test]
fn test_organize_missing_folder_is_an_error() {
    let ws = Workspace::new();
    assert!(run(&["-q", "organize", arg(&ws.dst.join("absent"))]).is_err());
}
