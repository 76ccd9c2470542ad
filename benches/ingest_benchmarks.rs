use criterion::{black_box, criterion_group, criterion_main, Criterion};
use photosort::compare::files_identical;
use photosort::duplicates::{find_duplicate_groups, group_by_size};
use photosort::naming::{DateFields, FileRecord, NameKey, NameRegistry, SuffixAllocator};
use photosort::scanner::{FileEntry, Walker, WalkerConfig};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tempfile::TempDir;

// Library-shaped tree: year folders with month subfolders of canonical names
fn setup_library(years: u32, files_per_month: u32) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for year in 2000..2000 + years {
        for month in 1..=12 {
            let dir = temp_dir.path().join(format!("{year}/{month:02}"));
            fs::create_dir_all(&dir).expect("Failed to create dir");
            for i in 0..files_per_month {
                let name = format!("{year}{month:02}01_120000_{i:03}.jpg");
                fs::write(dir.join(name), format!("{year}-{month}-{i}")).expect("Failed to write file");
            }
        }
        fs::create_dir_all(temp_dir.path().join(format!("{year}/edits"))).unwrap();
        fs::write(temp_dir.path().join(format!("{year}/edits/x.jpg")), "edit").unwrap();
    }
    temp_dir
}

// 1. Directory walking
fn bench_walker(c: &mut Criterion) {
    let temp_dir = setup_library(4, 5); // 240 canonical files

    let mut group = c.benchmark_group("walker");
    for (label, config) in [
        ("all_dirs", WalkerConfig::default()),
        ("date_tree", WalkerConfig::date_tree()),
    ] {
        group.bench_function(label, |b| {
            b.iter(|| {
                let files: Vec<_> = Walker::new(temp_dir.path(), config.clone()).walk().collect();
                black_box(files);
            })
        });
    }
    group.finish();
}

// 2. Byte comparison
fn bench_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("files_identical");

    for size_kb in [1, 1024, 10240] {
        let data = vec![b'a'; size_kb * 1024];
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a.dat");
        let b_path = temp_dir.path().join("b.dat");
        fs::write(&a, &data).expect("Failed to write bench file");
        fs::write(&b_path, &data).expect("Failed to write bench file");

        group.bench_function(format!("identical_{size_kb}KB"), |b| {
            b.iter(|| black_box(files_identical(&a, &b_path).unwrap()))
        });
    }
    group.finish();
}

// 3. Suffix allocation for a burst of same-second shots
fn bench_allocator(c: &mut Criterion) {
    let fields = DateFields::new(2020, 3, 15).with_time(14, 30, 22);
    let key = NameKey::from_fields(&fields).unwrap();
    let mut persisted = NameRegistry::new();
    for suffix in 0..100 {
        persisted.insert(key.clone(), suffix);
    }

    c.bench_function("allocate_500_after_100", |b| {
        b.iter(|| {
            let mut allocator = SuffixAllocator::new(persisted.clone());
            for _ in 0..500 {
                let mut record = FileRecord::new(Path::new("/in/IMG.jpg"), 1, fields);
                black_box(allocator.allocate(&mut record).unwrap());
            }
        })
    });
}

// 4. Duplicate grouping
fn bench_grouping(c: &mut Criterion) {
    let entries: Vec<FileEntry> = (0..10_000u64)
        .map(|i| FileEntry::new(PathBuf::from(format!("/lib/{i}.jpg")), i % 2_500, SystemTime::now()))
        .collect();

    c.bench_function("group_by_size_10k", |b| {
        b.iter(|| black_box(group_by_size(entries.clone())))
    });

    let temp_dir = TempDir::new().unwrap();
    let files: Vec<FileEntry> = (0..200)
        .map(|i| {
            let path = temp_dir.path().join(format!("{i:03}.jpg"));
            let content = format!("photo-{:04}", i % 50);
            fs::write(&path, &content).unwrap();
            FileEntry::new(path, content.len() as u64, SystemTime::now())
        })
        .collect();

    c.bench_function("find_duplicate_groups_200", |b| {
        b.iter(|| black_box(find_duplicate_groups(files.clone())))
    });
}

criterion_group!(benches, bench_walker, bench_compare, bench_allocator, bench_grouping);
criterion_main!(benches);
