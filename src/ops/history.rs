//! Undo, redo and snapshot listing for the journal file.

use crate::backup::{relative_time, BackupChooser, BackupEntry, BackupManager};
use crate::config::Config;
use crate::errors::AppResult;
use chrono::NaiveDateTime;
use tracing::info;

/// How to pick the state to move to.
pub enum Step<'a> {
    /// The n-th newest state, 1-based.
    Count(usize),
    /// Let the user choose.
    Choose(&'a dyn BackupChooser),
}

/// Restores an earlier version of the journal.
///
/// # Errors
///
/// Returns `BackupError::NoBackups` when there is nothing to undo,
/// `BackupError::CountOutOfRange` for a bad count and
/// `BackupError::SelectionCancelled` when the user backs out.
pub fn undo(config: &Config, backups: &BackupManager, step: Step<'_>) -> AppResult<BackupEntry> {
    let file = &config.journal_file;
    let entry = match step {
        Step::Count(count) => backups.undo(file, count)?,
        Step::Choose(chooser) => backups.select_backup(file, chooser)?,
    };
    info!("Undo complete");
    Ok(entry)
}

/// Reapplies a version removed by `undo`.
///
/// # Errors
///
/// Returns `BackupError::NoRedo` when nothing was undone, and otherwise the
/// same errors as [`undo`].
pub fn redo(config: &Config, backups: &BackupManager, step: Step<'_>) -> AppResult<BackupEntry> {
    let file = &config.journal_file;
    let entry = match step {
        Step::Count(count) => backups.redo(file, count)?,
        Step::Choose(chooser) => backups.select_redo(file, chooser)?,
    };
    info!("Redo complete");
    Ok(entry)
}

/// Snapshot listing, newest first, one line per snapshot.
///
/// # Errors
///
/// Returns `AppError::Path` if the backup directory cannot be read.
pub fn list_history(
    config: &Config,
    backups: &BackupManager,
    now: NaiveDateTime,
) -> AppResult<String> {
    let file = &config.journal_file;
    let mut out = String::new();
    for (label, entries) in [
        ("backup", backups.list_backups(file)?),
        ("redo", backups.list_undone(file)?),
    ] {
        for entry in entries {
            out.push_str(&format!(
                "{:<6} {} ({})\n",
                label,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                relative_time(entry.timestamp, now)
            ));
        }
    }
    Ok(out)
}
