use std::path::PathBuf;

use photosort::error::ExitCode;
use photosort::store::MappingStore;

use super::common::{arg, run, Workspace};

fn ingest(ws: &Workspace) {
    run(&["-q", "ingest", "-s", arg(&ws.src), "-d", arg(&ws.dst), "--permanent"]).unwrap();
}

#[test]
fn test_relocate_splits_messenger_files() {
    let ws = Workspace::new();
    let chat = ws.source("VID-20191231-WA0004.mp4", b"chat video");
    let camera = ws.source("IMG_20191231_101010.jpg", b"camera");
    ingest(&ws);
    let before = MappingStore::load(ws.dst.join("files.txt")).unwrap();
    let chat_dst = PathBuf::from(before.get(&chat.to_string_lossy()).unwrap());

    let plan = run(&["-q", "relocate", arg(&ws.dst), "whatsapp", "-p", r".*-WA\d+"]).unwrap();
    assert_eq!(plan, ExitCode::Success);
    assert!(chat_dst.exists());
    assert!(!ws.dst.join("whatsapp").exists());

    let code = run(&["-q", "relocate", arg(&ws.dst), "whatsapp", "-p", r".*-WA\d+", "--apply"]).unwrap();

    assert_eq!(code, ExitCode::Success);
    let moved = ws.dst.join("whatsapp").join(chat_dst.file_name().unwrap());
    assert!(moved.exists());
    assert!(!chat_dst.exists());

    let library = MappingStore::load(ws.dst.join("files.txt")).unwrap();
    assert_eq!(library.len(), 1);
    assert!(library.get(&camera.to_string_lossy()).is_some());
    let split = MappingStore::load(ws.dst.join("whatsapp/files.txt")).unwrap();
    assert_eq!(
        split.get(&chat.to_string_lossy()).map(str::to_string),
        Some(moved.to_string_lossy().into_owned())
    );
}

#[test]
fn test_relocated_names_stay_reserved() {
    let ws = Workspace::new();
    ws.source("IMG_20191231_101010.jpg", b"first");
    ingest(&ws);
    run(&["-q", "relocate", arg(&ws.dst), "archive", "-p", "IMG_", "--apply"]).unwrap();

    ws.source("IMG_20191231_101010.jpg", b"second");
    ingest(&ws);

    assert!(ws.dst.join("archive/20191231_101010_000.jpg").exists());
    assert!(ws.dst.join("2019/20191231_101010_001.jpg").exists());
    assert!(!ws.dst.join("2019/20191231_101010_000.jpg").exists());
}

#[test]
fn test_relocate_bad_pattern_is_an_error() {
    let ws = Workspace::new();

    assert!(run(&["-q", "relocate", arg(&ws.dst), "x", "-p", "("]).is_err());
}
