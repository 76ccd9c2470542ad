use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use photosort::cli::Cli;
use photosort::error::ExitCode;
use tempfile::TempDir;

/// A source folder and a library folder under one temp dir.
pub struct Workspace {
    _dir: TempDir,
    pub src: PathBuf,
    pub dst: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("inbox");
        let dst = dir.path().join("library");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        Self { _dir: dir, src, dst }
    }

    pub fn source(&self, name: &str, content: &[u8]) -> PathBuf {
        write(&self.src.join(name), content)
    }

    pub fn library(&self, rel: &str, content: &[u8]) -> PathBuf {
        write(&self.dst.join(rel), content)
    }
}

pub fn write(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    path.to_path_buf()
}

/// Parse `args` (without the program name) and run them.
pub fn run(args: &[&str]) -> anyhow::Result<ExitCode> {
    let cli = Cli::try_parse_from(std::iter::once("photosort").chain(args.iter().copied()))
        .expect("valid command line");
    photosort::run_app(cli)
}

pub fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}
