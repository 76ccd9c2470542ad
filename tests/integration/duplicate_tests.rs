use std::fs;

use photosort::duplicates::{scan_for_duplicates, ScanOptions};
use photosort::error::ExitCode;

use super::common::{arg, run, write, Workspace};

#[test]
fn test_two_identical_and_one_larger_file() {
    let ws = Workspace::new();
    let a = ws.library("a.jpg", b"0123456789");
    let b = ws.library("nested/b.jpg", b"0123456789");
    ws.library("c.jpg", b"0123456789AB");

    let (groups, stats) = scan_for_duplicates(&ws.dst, &ScanOptions::default()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 10);
    assert_eq!(groups[0].files, vec![a, b]);
    assert_eq!(stats.total_files, 3);
    assert_eq!(stats.duplicate_files, 1);
    assert_eq!(stats.wasted_space, 10);
}

#[test]
fn test_same_size_different_content_is_not_a_group() {
    let ws = Workspace::new();
    ws.library("a.jpg", b"aaaa");
    ws.library("b.jpg", b"bbbb");

    let (groups, stats) = scan_for_duplicates(&ws.dst, &ScanOptions::default()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(stats.comparisons, 1);
}

#[test]
fn test_media_only_and_store_are_excluded() {
    let ws = Workspace::new();
    ws.library("a.txt", b"same");
    ws.library("b.txt", b"same");
    ws.library("files.txt", b"same");

    let options = ScanOptions::default()
        .with_media_only(true)
        .excluding_name("files.txt");
    let (groups, stats) = scan_for_duplicates(&ws.dst, &options).unwrap();

    assert!(groups.is_empty());
    assert_eq!(stats.total_files, 0);
}

#[test]
fn test_report_command_writes_html() {
    let ws = Workspace::new();
    ws.library("2020/20200101_000000_000.jpg", b"twin");
    ws.library("2020/20200101_000000_001.jpg", b"twin");

    let code = run(&["-q", "report", arg(&ws.dst)]).unwrap();

    assert_eq!(code, ExitCode::Success);
    let html = fs::read_to_string(ws.dst.join("duplicate_report.html")).unwrap();
    assert!(html.contains("Group 1 (2 files,"));
    assert!(html.contains("20200101_000000_001.jpg"));
}

#[test]
fn test_report_without_duplicates() {
    let ws = Workspace::new();
    ws.library("only.jpg", b"alone");
    let output = ws.src.join("report.html");

    let code = run(&["-q", "report", arg(&ws.dst), "-o", arg(&output)]).unwrap();

    assert_eq!(code, ExitCode::NoDuplicates);
    assert!(fs::read_to_string(&output).unwrap().contains("0 duplicate groups"));
}

#[test]
fn test_report_ignores_its_previous_output() {
    let ws = Workspace::new();
    ws.library("a.jpg", b"twin");
    ws.library("b.jpg", b"twin");
    run(&["-q", "report", arg(&ws.dst)]).unwrap();
    let first = fs::read_to_string(ws.dst.join("duplicate_report.html")).unwrap();

    run(&["-q", "report", arg(&ws.dst)]).unwrap();
    let second = fs::read_to_string(ws.dst.join("duplicate_report.html")).unwrap();

    assert!(first.contains("1 duplicate groups"));
    assert!(second.contains("1 duplicate groups"));
    assert!(second.contains("2 files"));
}

#[test]
fn test_report_ignores_custom_output_inside_folder() {
    let ws = Workspace::new();
    ws.library("a.jpg", b"twin");
    ws.library("b.jpg", b"twin");
    let output = ws.dst.join("custom.html");

    run(&["-q", "report", arg(&ws.dst), "-o", arg(&output)]).unwrap();
    fs::copy(&output, ws.dst.join("copy_of_report.html")).unwrap();
    run(&["-q", "report", arg(&ws.dst), "-o", arg(&output)]).unwrap();

    let second = fs::read_to_string(&output).unwrap();
    assert!(second.contains("&middot; 3 files,"));
    assert!(!second.contains("custom.html"));
}

#[test]
fn test_dupes_is_a_dry_run_by_default() {
    let ws = Workspace::new();
    let a = ws.library("a.jpg", b"twin");
    let b = ws.library("b.jpg", b"twin");

    let code = run(&["-q", "dupes", arg(&ws.dst)]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_dupes_delete_keeps_the_first_copy() {
    let ws = Workspace::new();
    let a = ws.library("a.jpg", b"twin");
    let b = ws.library("b.jpg", b"twin");
    let c = write(&ws.dst.join("sub/c.jpg"), b"twin");

    let code = run(&["-q", "dupes", arg(&ws.dst), "--delete", "--permanent"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(a.exists());
    assert!(!b.exists());
    assert!(!c.exists());
}

#[test]
fn test_dupes_on_missing_folder_is_an_error() {
    let ws = Workspace::new();
    assert!(run(&["-q", "dupes", arg(&ws.dst.join("absent"))]).is_err());
}
