use chrono::{NaiveDate, NaiveDateTime};
use logbook::backup::BackupManager;
use logbook::content::Content;
use logbook::journal_io;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tempfile::tempdir;

/// A clock that advances one minute per reading.
fn ticking_clock() -> impl Fn() -> NaiveDateTime + Send + Sync + 'static {
    let start = NaiveDate::from_ymd_opt(2024, 2, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    let ticks = Arc::new(AtomicI64::new(0));
    move || start + chrono::Duration::minutes(ticks.fetch_add(1, Ordering::SeqCst))
}

fn write_version(path: &Path, backups: &BackupManager, version: &str) {
    let text = format!("Currently:\n\t- 2024-02-01 09:00 | {}\n", version);
    journal_io::write_content(path, &Content::parse(&text), backups).unwrap();
}

fn current_title(path: &Path) -> String {
    let content = journal_io::load_content(path).unwrap();
    content.items()[0].title().to_string()
}

#[test]
fn test_backup_lifecycle() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = temp_dir.path().join("doing.md");
    let backups = BackupManager::new(temp_dir.path().join("backups"), 15).with_clock(ticking_clock());

    write_version(&journal, &backups, "v1");
    assert_eq!(backups.list_backups(&journal).unwrap().len(), 0);
    write_version(&journal, &backups, "v2");
    assert_eq!(backups.list_backups(&journal).unwrap().len(), 1);
    write_version(&journal, &backups, "v3");
    assert_eq!(backups.list_backups(&journal).unwrap().len(), 2);

    backups.undo(&journal, 1).unwrap();
    assert_eq!(current_title(&journal), "v2");
    assert_eq!(backups.list_undone(&journal).unwrap().len(), 1);

    backups.redo(&journal, 1).unwrap();
    assert_eq!(current_title(&journal), "v3");
    assert_eq!(backups.list_undone(&journal).unwrap().len(), 0);
}

#[test]
fn test_prune_keeps_most_recent() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = temp_dir.path().join("doing.md");
    let backups = BackupManager::new(temp_dir.path().join("backups"), 15).with_clock(ticking_clock());

    for version in ["v1", "v2", "v3", "v4", "v5", "v6"] {
        write_version(&journal, &backups, version);
    }
    assert_eq!(backups.list_backups(&journal).unwrap().len(), 5);

    backups.prune(&journal, 3).unwrap();
    let remaining = backups.list_backups(&journal).unwrap();
    assert_eq!(remaining.len(), 3);

    let kept: Vec<String> = remaining
        .iter()
        .map(|entry| {
            let text = fs::read_to_string(&entry.path).unwrap();
            Content::parse(&text).items()[0].title().to_string()
        })
        .collect();
    assert_eq!(kept, vec!["v5", "v4", "v3"]);
}

#[test]
fn test_undo_twice_then_write_discards_redo() {
    let temp_dir = tempdir().expect("Failed to create temporary directory");
    let journal = temp_dir.path().join("doing.md");
    let backups = BackupManager::new(temp_dir.path().join("backups"), 15).with_clock(ticking_clock());

    for version in ["v1", "v2", "v3", "v4"] {
        write_version(&journal, &backups, version);
    }

    backups.undo(&journal, 2).unwrap();
    assert_eq!(current_title(&journal), "v2");
    assert_eq!(backups.list_undone(&journal).unwrap().len(), 2);

    write_version(&journal, &backups, "v2b");
    assert!(backups.list_undone(&journal).unwrap().is_empty());
    assert!(backups.redo(&journal, 1).is_err());
}
