use std::fs;

use photosort::error::ExitCode;
use photosort::store::MappingStore;

use super::common::{arg, run, Workspace};

#[test]
fn test_ingest_moves_renames_and_records() {
    let ws = Workspace::new();
    let a = ws.source("IMG_20200315_143022.jpg", b"first");
    let b = ws.source("VID_20200315_143022.mp4", b"second clip");

    let code = run(&[
        "-q", "ingest", "--src", arg(&ws.src), "--dst", arg(&ws.dst), "--permanent",
    ])
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!a.exists());
    assert!(!b.exists());
    assert_eq!(fs::read(ws.dst.join("2020/20200315_143022_000.jpg")).unwrap(), b"first");
    assert_eq!(fs::read(ws.dst.join("2020/20200315_143022_001.mp4")).unwrap(), b"second clip");

    let store = MappingStore::load(ws.dst.join("files.txt")).unwrap();
    assert_eq!(store.len(), 2);
    assert!(store.get(&a.to_string_lossy()).unwrap().ends_with("20200315_143022_000.jpg"));
}

#[test]
fn test_second_ingest_rejects_what_the_library_holds() {
    let ws = Workspace::new();
    ws.source("IMG_20210101_080000.jpg", b"sunrise");
    run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "--permanent"]).unwrap();

    let again = ws.source("IMG_20210101_080000_1.jpg", b"sunrise");
    let other = ws.source("IMG_20210101_080000_2.jpg", b"sunset");
    let code = run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "--permanent"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(!again.exists(), "rejected copy is removed from the source");
    assert!(!other.exists());
    assert!(ws.dst.join("2021/20210101_080000_001.jpg").exists());
    assert!(!ws.dst.join("2021/20210101_080000_002.jpg").exists());
    assert_eq!(MappingStore::load(ws.dst.join("files.txt")).unwrap().len(), 2);
}

#[test]
fn test_ingest_by_month_and_accept_preset() {
    let ws = Workspace::new();
    let phone = ws.source("IMG_20221105_101010.jpg", b"phone");
    let scan = ws.source("scan_001.jpg", b"scanner");

    run(&[
        "-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst),
        "--by-month", "-a", "phone", "--permanent",
    ])
    .unwrap();

    assert!(!phone.exists());
    assert!(ws.dst.join("2022/11/20221105_101010_000.jpg").exists());
    assert!(scan.exists(), "names outside the accept list stay put");
}

#[test]
fn test_ingest_dry_run_changes_nothing() {
    let ws = Workspace::new();
    let file = ws.source("IMG_20200101_000000.jpg", b"x");

    let code = run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "--dry-run"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(file.exists());
    assert_eq!(fs::read_dir(&ws.dst).unwrap().count(), 0);
}

#[test]
fn test_ingest_custom_store_name() {
    let ws = Workspace::new();
    ws.source("IMG_20200101_000000.jpg", b"x");

    run(&[
        "-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst),
        "--store-name", "mapping.json", "--permanent",
    ])
    .unwrap();

    assert!(ws.dst.join("mapping.json").exists());
    assert!(!ws.dst.join("files.txt").exists());
}

#[test]
fn test_ingest_errors_stop_the_run() {
    let ws = Workspace::new();
    ws.source("IMG_20200101_000000.jpg", b"x");

    let unknown = run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "-c", "hash"]);
    assert!(unknown.is_err());

    let missing = ws.src.join("missing");
    assert!(run(&["-q", "ingest", "-s", arg(&missing), "-d", arg(&ws.dst)]).is_err());

    let bad_regex = run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "-i", "("]);
    assert!(bad_regex.is_err());

    fs::write(ws.dst.join("files.txt"), "not json").unwrap();
    let corrupt = run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst)]);
    let message = format!("{:#}", corrupt.unwrap_err());
    assert!(message.contains("files.txt"), "{message}");

    assert!(ws.src.join("IMG_20200101_000000.jpg").exists());
}
