use super::*;
use chrono::NaiveDate;
use std::cell::RefCell;
use tempfile::{tempdir, TempDir};

fn fixed_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 10)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

struct Fixture {
    _dir: TempDir,
    file: PathBuf,
    manager: BackupManager,
}

fn fixture(history_size: usize) -> Fixture {
    let dir = tempdir().expect("Failed to create temporary directory");
    let file = dir.path().join("journal.md");
    let manager = BackupManager::new(dir.path().join("backups"), history_size).with_clock(fixed_now);
    Fixture {
        _dir: dir,
        file,
        manager,
    }
}

impl Fixture {
    /// What `journal_io::write_content` does: snapshot, then overwrite.
    fn write(&self, text: &str) {
        self.manager.write_backup(&self.file).unwrap();
        fs::write(&self.file, text).unwrap();
    }

    fn read(&self) -> String {
        fs::read_to_string(&self.file).unwrap()
    }
}

struct ScriptedChooser {
    answer: Option<usize>,
    seen: RefCell<Vec<String>>,
}

impl BackupChooser for ScriptedChooser {
    fn choose(&self, _prompt: &str, labels: &[String]) -> AppResult<Option<usize>> {
        self.seen.borrow_mut().extend(labels.iter().cloned());
        Ok(self.answer)
    }
}

#[test]
fn test_entry_from_path() {
    let normal = BackupEntry::from_path(Path::new("/b/2024-01-10_12.00.05___journal.md")).unwrap();
    assert!(!normal.undone);
    assert_eq!(normal.original_filename, "journal.md");
    assert_eq!(normal.timestamp.to_string(), "2024-01-10 12:00:05");

    let undone =
        BackupEntry::from_path(Path::new("/b/undone2024-01-10_12.00.05___journal.md")).unwrap();
    assert!(undone.undone);

    assert!(BackupEntry::from_path(Path::new("/b/notes.txt")).is_none());
    assert!(BackupEntry::from_path(Path::new("/b/2024-01-10_12.00.05___")).is_none());
}

#[test]
fn test_snapshot_names_sort_chronologically() {
    let earlier = snapshot_name(fixed_now(), "journal.md", false);
    let later = snapshot_name(fixed_now() + Duration::seconds(1), "journal.md", false);
    assert_eq!(earlier, "2024-01-10_12.00.00___journal.md");
    assert!(earlier < later);
}

#[test]
fn test_missing_or_empty_file_is_not_backed_up() {
    let fx = fixture(15);
    assert!(fx.manager.write_backup(&fx.file).unwrap().is_none());

    fs::write(&fx.file, "").unwrap();
    assert!(fx.manager.write_backup(&fx.file).unwrap().is_none());
    assert!(fx.manager.list_backups(&fx.file).unwrap().is_empty());
}

#[test]
fn test_lifecycle_undo_then_redo() {
    let fx = fixture(15);
    fx.write("v1");
    fx.write("v2");
    assert_eq!(fx.manager.list_backups(&fx.file).unwrap().len(), 1);
    fx.write("v3");
    assert_eq!(fx.manager.list_backups(&fx.file).unwrap().len(), 2);

    fx.manager.undo(&fx.file, 1).unwrap();
    assert_eq!(fx.read(), "v2");
    assert_eq!(fx.manager.list_undone(&fx.file).unwrap().len(), 1);

    fx.manager.redo(&fx.file, 1).unwrap();
    assert_eq!(fx.read(), "v3");
    assert!(fx.manager.list_undone(&fx.file).unwrap().is_empty());

    // the redo kept v2 as history, so undo works again
    fx.manager.undo(&fx.file, 1).unwrap();
    assert_eq!(fx.read(), "v2");
}

#[test]
fn test_undo_further_back_parks_newer_snapshots() {
    let fx = fixture(15);
    for version in ["v1", "v2", "v3", "v4"] {
        fx.write(version);
    }

    fx.manager.undo(&fx.file, 2).unwrap();
    assert_eq!(fx.read(), "v2");
    assert_eq!(fx.manager.list_backups(&fx.file).unwrap().len(), 1);
    // the live v4 plus the skipped v3
    assert_eq!(fx.manager.list_undone(&fx.file).unwrap().len(), 2);

    fx.manager.redo(&fx.file, 1).unwrap();
    assert_eq!(fx.read(), "v4");
}

#[test]
fn test_redo_skipped_snapshots_become_history() {
    let fx = fixture(15);
    for version in ["v1", "v2", "v3"] {
        fx.write(version);
    }
    fx.manager.undo(&fx.file, 1).unwrap();
    fx.manager.undo(&fx.file, 1).unwrap();
    assert_eq!(fx.read(), "v1");
    assert_eq!(fx.manager.list_undone(&fx.file).unwrap().len(), 2);

    fx.manager.redo(&fx.file, 2).unwrap();
    assert!(fx.manager.list_undone(&fx.file).unwrap().is_empty());
    let backups = fx.manager.list_backups(&fx.file).unwrap();
    assert!(backups.iter().all(|b| !b.undone));
}

#[test]
fn test_fresh_write_clears_redo_history() {
    let fx = fixture(15);
    fx.write("v1");
    fx.write("v2");
    fx.manager.undo(&fx.file, 1).unwrap();
    assert_eq!(fx.manager.list_undone(&fx.file).unwrap().len(), 1);

    fx.write("v3");
    assert!(fx.manager.list_undone(&fx.file).unwrap().is_empty());
    assert!(matches!(
        fx.manager.redo(&fx.file, 1),
        Err(AppError::Backup(BackupError::NoRedo(_)))
    ));
}

#[test]
fn test_prune_keeps_most_recent() {
    let fx = fixture(15);
    for version in ["v1", "v2", "v3", "v4", "v5"] {
        fx.write(version);
    }
    let before = fx.manager.list_backups(&fx.file).unwrap();
    assert_eq!(before.len(), 4);

    fx.manager.prune(&fx.file, 3).unwrap();
    let after = fx.manager.list_backups(&fx.file).unwrap();
    assert_eq!(after.len(), 3);
    assert_eq!(after, before[..3].to_vec());
}

#[test]
fn test_history_size_applies_on_write() {
    let fx = fixture(2);
    for version in ["v1", "v2", "v3", "v4", "v5"] {
        fx.write(version);
    }
    let backups = fx.manager.list_backups(&fx.file).unwrap();
    assert_eq!(backups.len(), 2);
    assert_eq!(fs::read_to_string(&backups[0].path).unwrap(), "v4");
}

#[test]
fn test_backups_of_other_files_are_ignored() {
    let fx = fixture(15);
    fx.write("v1");
    fx.write("v2");
    let other = fx.file.with_file_name("other.md");
    assert!(fx.manager.list_backups(&other).unwrap().is_empty());
}

#[test]
fn test_undo_errors() {
    let fx = fixture(15);
    assert!(matches!(
        fx.manager.undo(&fx.file, 1),
        Err(AppError::Backup(BackupError::NoBackups(_)))
    ));

    fx.write("v1");
    fx.write("v2");
    assert!(matches!(
        fx.manager.undo(&fx.file, 5),
        Err(AppError::Backup(BackupError::CountOutOfRange {
            requested: 5,
            available: 1
        }))
    ));
    assert!(fx.manager.undo(&fx.file, 0).is_err());
    assert_eq!(fx.read(), "v2");
}

#[test]
fn test_select_backup() {
    let fx = fixture(15);
    for version in ["v1", "v2", "v3"] {
        fx.write(version);
    }

    let chooser = ScriptedChooser {
        answer: Some(1),
        seen: RefCell::new(Vec::new()),
    };
    fx.manager.select_backup(&fx.file, &chooser).unwrap();
    assert_eq!(fx.read(), "v1");
    assert_eq!(chooser.seen.borrow().len(), 2);
    assert!(chooser.seen.borrow()[0].contains("2024-01-10"));
}

#[test]
fn test_select_cancelled() {
    let fx = fixture(15);
    fx.write("v1");
    fx.write("v2");
    let chooser = ScriptedChooser {
        answer: None,
        seen: RefCell::new(Vec::new()),
    };
    assert!(matches!(
        fx.manager.select_backup(&fx.file, &chooser),
        Err(AppError::Backup(BackupError::SelectionCancelled))
    ));
    assert!(matches!(
        fx.manager.select_redo(&fx.file, &chooser),
        Err(AppError::Backup(BackupError::NoRedo(_)))
    ));
    assert_eq!(fx.read(), "v2");
}

#[test]
fn test_relative_time() {
    let now = fixed_now();
    assert_eq!(relative_time(now - Duration::seconds(20), now), "just now");
    assert_eq!(relative_time(now - Duration::minutes(1), now), "1 minute ago");
    assert_eq!(relative_time(now - Duration::minutes(5), now), "5 minutes ago");
    assert_eq!(relative_time(now - Duration::hours(3), now), "3 hours ago");
    assert_eq!(relative_time(now - Duration::days(2), now), "2 days ago");
}
