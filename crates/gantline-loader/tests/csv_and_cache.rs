//! Integration tests for CSV input, error taxonomy and the task cache

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use gantline_loader::{load, LoadError, LoadOptions, Profile, TaskCache};
use tempfile::TempDir;

const PREAMBLE: &str = "SmarTriage Gantt,,,\n,,,\n,,,\n,,,\n,,,\n,,,\n,,,\n,,,\n";

fn write_csv(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("{PREAMBLE}{body}")).unwrap();
    path
}

fn set_mtime(path: &Path, secs: u64) {
    let file = fs::File::options().write(true).open(path).unwrap();
    file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

const PLAN: &str = "\
Milestone description,Category,Start,Days
Kickoff,Planning & Preparation,2025-01-01,10
\"Design review\",\"Evaluation &
Visual Interface\",2025-01-15,3
";

#[test]
fn csv_plan_loads() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "plan.csv", PLAN);

    let table = load(&path, &LoadOptions::default()).unwrap();
    assert_eq!(table.tasks.len(), 2);
    assert_eq!(table.tasks[1].category, "Evaluation & Visual Interface");
    assert_eq!(table.source, path);
}

#[test]
fn missing_file_is_not_found() {
    let dir = TempDir::new().unwrap();
    let err = load(dir.path().join("GANTT_TAI.xlsx"), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::NotFound(_)));
    assert!(err.to_string().contains("GANTT_TAI.xlsx"));
}

#[test]
fn unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("plan.txt");
    fs::write(&path, "whatever").unwrap();
    assert!(matches!(
        load(&path, &LoadOptions::default()),
        Err(LoadError::UnsupportedFormat(_))
    ));
}

#[test]
fn empty_after_filtering_is_distinct() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "undated.csv",
        "Milestone description,Category,Start,Days\nKickoff,Docs,,10\nReview,Docs,tbd,2\n",
    );
    match load(&path, &LoadOptions::default()) {
        Err(LoadError::NoValidTasks { dropped }) => assert_eq!(dropped, 2),
        other => panic!("expected NoValidTasks, got {other:?}"),
    }
}

#[test]
fn progress_column_read_when_present() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(
        dir.path(),
        "progress.csv",
        "Milestone description,Category,Start,Days,Progress\nKickoff,Docs,2025-01-01,10,40%\nReview,Docs,2025-01-02,2,\n",
    );
    let table = load(&path, &LoadOptions::new(Profile::Chart).require_progress()).unwrap();
    assert_eq!(table.tasks[0].sheet_progress, Some(40.0));
    assert_eq!(table.tasks[1].sheet_progress, None);
}

#[test]
fn cache_serves_until_mtime_changes() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "plan.csv", PLAN);
    set_mtime(&path, 1_000);

    let mut cache = TaskCache::new(LoadOptions::default());
    assert_eq!(cache.get_or_load(&path).unwrap().tasks.len(), 2);

    // Same mtime: the cached table is served even though content changed
    fs::write(
        &path,
        format!("{PREAMBLE}Milestone description,Category,Start,Days\nOnly,Docs,2025-03-01,1\n"),
    )
    .unwrap();
    set_mtime(&path, 1_000);
    assert_eq!(cache.get_or_load(&path).unwrap().tasks.len(), 2);

    set_mtime(&path, 2_000);
    let table = cache.get_or_load(&path).unwrap();
    assert_eq!(table.tasks.len(), 1);
    assert_eq!(table.tasks[0].name, "Only");
    assert_eq!(cache.len(), 1);
}

#[test]
fn invalidate_forces_reload() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "plan.csv", PLAN);
    set_mtime(&path, 1_000);

    let mut cache = TaskCache::new(LoadOptions::default());
    cache.get_or_load(&path).unwrap();

    fs::write(
        &path,
        format!("{PREAMBLE}Milestone description,Category,Start,Days\nOnly,Docs,2025-03-01,1\n"),
    )
    .unwrap();
    set_mtime(&path, 1_000);

    assert!(cache.invalidate(&path));
    assert!(cache.is_empty());
    assert_eq!(cache.get_or_load(&path).unwrap().tasks.len(), 1);
    assert!(!cache.invalidate(&dir.path().join("other.csv")));
}

#[test]
fn failed_reload_evicts_entry() {
    let dir = TempDir::new().unwrap();
    let path = write_csv(dir.path(), "plan.csv", PLAN);
    set_mtime(&path, 1_000);

    let mut cache = TaskCache::new(LoadOptions::default());
    cache.get_or_load(&path).unwrap();

    fs::write(&path, format!("{PREAMBLE}Milestone description,Category,Start\nOnly,Docs,2025-03-01\n")).unwrap();
    set_mtime(&path, 3_000);

    assert!(matches!(cache.get_or_load(&path), Err(LoadError::MissingColumns(_))));
    assert!(cache.is_empty());

    fs::remove_file(&path).unwrap();
    assert!(matches!(cache.get_or_load(&path), Err(LoadError::NotFound(_))));
}
