//! Snapshot-based backup, undo and redo for the journal file.
//!
//! Every write first copies the previous file into the backup directory as
//! `<YYYY-MM-DD_HH.MM.SS>___<basename>`. Undo moves a snapshot back into
//! place and parks the replaced states under an `undone` prefix, where redo
//! can find them until the next write clears them.
//!
//! Snapshot names sort lexicographically in chronological order. A new
//! stamp is never earlier than one second past the newest existing stamp for
//! the same basename, so several writes within one second still produce
//! distinct, ordered snapshots.

use crate::config::Config;
use crate::constants::{BACKUP_SEPARATOR, BACKUP_STAMP_FORMAT, UNDONE_PREFIX};
use crate::errors::{AppError, AppResult, BackupError};
use chrono::{Duration, Local, NaiveDateTime, Timelike};
use dialoguer::Select;
use std::fmt;
use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

#[cfg(test)]
mod tests;

/// One snapshot file in the backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub timestamp: NaiveDateTime,
    pub original_filename: String,
    pub path: PathBuf,
    /// Whether the snapshot lives in the redo namespace.
    pub undone: bool,
}

impl BackupEntry {
    /// Recognizes a snapshot file name, returning `None` for anything else.
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let (undone, rest) = match name.strip_prefix(UNDONE_PREFIX) {
            Some(rest) => (true, rest),
            None => (false, name),
        };
        let (stamp, original) = rest.split_once(BACKUP_SEPARATOR)?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, BACKUP_STAMP_FORMAT).ok()?;
        if original.is_empty() {
            return None;
        }
        Some(BackupEntry {
            timestamp,
            original_filename: original.to_string(),
            path: path.to_path_buf(),
            undone,
        })
    }
}

/// File name of a snapshot of `basename` taken at `stamp`.
pub fn snapshot_name(stamp: NaiveDateTime, basename: &str, undone: bool) -> String {
    format!(
        "{}{}{}{}",
        if undone { UNDONE_PREFIX } else { "" },
        stamp.format(BACKUP_STAMP_FORMAT),
        BACKUP_SEPARATOR,
        basename
    )
}

/// Human-relative label for a snapshot time, e.g. `5 minutes ago`.
pub fn relative_time(then: NaiveDateTime, now: NaiveDateTime) -> String {
    let elapsed = now - then;
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {} ago", unit)
        } else {
            format!("{} {}s ago", n, unit)
        }
    };
    if elapsed < Duration::minutes(1) {
        "just now".to_string()
    } else if elapsed < Duration::hours(1) {
        plural(elapsed.num_minutes(), "minute")
    } else if elapsed < Duration::days(1) {
        plural(elapsed.num_hours(), "hour")
    } else {
        plural(elapsed.num_days(), "day")
    }
}

/// Interactive selection from a list of snapshot labels.
pub trait BackupChooser {
    /// Returns the chosen index, or `None` if the user backed out.
    ///
    /// # Errors
    ///
    /// Implementations return an error when no choice can be made at all,
    /// for example without a terminal.
    fn choose(&self, prompt: &str, labels: &[String]) -> AppResult<Option<usize>>;
}

/// Terminal chooser backed by `dialoguer`.
pub struct DialoguerChooser;

impl BackupChooser for DialoguerChooser {
    fn choose(&self, prompt: &str, labels: &[String]) -> AppResult<Option<usize>> {
        if !std::io::stdin().is_terminal() {
            return Err(AppError::Config(
                "Interactive selection requires a terminal".to_string(),
            ));
        }
        Select::new()
            .with_prompt(prompt)
            .items(labels)
            .default(0)
            .interact_opt()
            .map_err(|e| AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, e)))
    }
}

type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

fn system_clock() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Manages the snapshots of journal files in one backup directory.
#[derive(Clone)]
pub struct BackupManager {
    backup_dir: PathBuf,
    history_size: usize,
    clock: Clock,
}

impl fmt::Debug for BackupManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackupManager")
            .field("backup_dir", &self.backup_dir)
            .field("history_size", &self.history_size)
            .finish()
    }
}

fn basename(file: &Path) -> AppResult<String> {
    file.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::Config(format!("Not a file path: {}", file.display())))
}

/// Renames `from` to `to`, copying across filesystems when needed.
fn move_file(from: &Path, to: &Path) -> AppResult<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| AppError::path(to, e))?;
    fs::remove_file(from).map_err(|e| AppError::path(from, e))?;
    Ok(())
}

impl BackupManager {
    pub fn new(backup_dir: impl Into<PathBuf>, history_size: usize) -> Self {
        BackupManager {
            backup_dir: backup_dir.into(),
            history_size,
            clock: Arc::new(system_clock),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        BackupManager::new(config.backup_dir.clone(), config.history_size)
    }

    /// Replaces the system clock, which stamps new snapshots and anchors
    /// relative labels.
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    pub fn history_size(&self) -> usize {
        self.history_size
    }

    fn now(&self) -> NaiveDateTime {
        let now = (self.clock)();
        now.with_nanosecond(0).unwrap_or(now)
    }

    fn ensure_dir(&self) -> AppResult<()> {
        fs::create_dir_all(&self.backup_dir).map_err(|e| AppError::path(&self.backup_dir, e))
    }

    fn list(&self, file: &Path, undone: bool) -> AppResult<Vec<BackupEntry>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }
        let name = basename(file)?;
        let mut entries: Vec<BackupEntry> = WalkDir::new(&self.backup_dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| BackupEntry::from_path(e.path()))
            .filter(|entry| entry.undone == undone && entry.original_filename == name)
            .collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(entries)
    }

    /// Normal snapshots of `file`, newest first.
    pub fn list_backups(&self, file: &Path) -> AppResult<Vec<BackupEntry>> {
        self.list(file, false)
    }

    /// Redo snapshots of `file`, newest first.
    pub fn list_undone(&self, file: &Path) -> AppResult<Vec<BackupEntry>> {
        self.list(file, true)
    }

    fn next_stamp(&self, file: &Path) -> AppResult<NaiveDateTime> {
        let now = self.now();
        let latest = self
            .list_backups(file)?
            .into_iter()
            .chain(self.list_undone(file)?)
            .map(|entry| entry.timestamp)
            .max();
        Ok(match latest {
            Some(latest) if latest >= now => latest + Duration::seconds(1),
            _ => now,
        })
    }

    fn snapshot(&self, file: &Path, undone: bool) -> AppResult<PathBuf> {
        self.ensure_dir()?;
        let stamp = self.next_stamp(file)?;
        let target = self.backup_dir.join(snapshot_name(stamp, &basename(file)?, undone));
        fs::copy(file, &target).map_err(|e| AppError::path(&target, e))?;
        debug!("Snapshot {} -> {}", file.display(), target.display());
        Ok(target)
    }

    /// Snapshots `file` before it is overwritten.
    ///
    /// A missing or empty file is not copied. Either way old snapshots
    /// beyond `history_size` are pruned and redo history is cleared, since a
    /// fresh write invalidates it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Path` if the backup directory cannot be created or
    /// written.
    pub fn write_backup(&self, file: &Path) -> AppResult<Option<PathBuf>> {
        let has_content = fs::metadata(file).map(|m| m.len() > 0).unwrap_or(false);
        let created = if has_content {
            Some(self.snapshot(file, false)?)
        } else {
            debug!("Nothing to back up at {}", file.display());
            None
        };
        self.prune(file, self.history_size)?;
        Ok(created)
    }

    /// Deletes the oldest normal snapshots beyond `limit` and clears the
    /// redo history.
    pub fn prune(&self, file: &Path, limit: usize) -> AppResult<usize> {
        let removed = self.trim(file, limit)?;
        self.clear_undone(file)?;
        Ok(removed)
    }

    fn trim(&self, file: &Path, limit: usize) -> AppResult<usize> {
        let backups = self.list_backups(file)?;
        let mut removed = 0;
        for entry in backups.iter().skip(limit) {
            fs::remove_file(&entry.path).map_err(|e| AppError::path(&entry.path, e))?;
            removed += 1;
        }
        if removed > 0 {
            debug!("Pruned {} old backups", removed);
        }
        Ok(removed)
    }

    /// Removes every redo snapshot of `file`.
    pub fn clear_undone(&self, file: &Path) -> AppResult<usize> {
        let undone = self.list_undone(file)?;
        for entry in &undone {
            fs::remove_file(&entry.path).map_err(|e| AppError::path(&entry.path, e))?;
        }
        Ok(undone.len())
    }

    fn check_count(count: usize, available: usize) -> AppResult<()> {
        if count == 0 || count > available {
            return Err(BackupError::CountOutOfRange {
                requested: count,
                available,
            }
            .into());
        }
        Ok(())
    }

    /// Restores the `count`-th newest snapshot (1-based) of `file`.
    ///
    /// The current file is parked in the redo namespace first, and snapshots
    /// newer than the restored one move there too.
    ///
    /// # Errors
    ///
    /// - `BackupError::NoBackups` if `file` has no snapshots
    /// - `BackupError::CountOutOfRange` if `count` is 0 or too large
    /// - `AppError::Path` for filesystem failures
    pub fn undo(&self, file: &Path, count: usize) -> AppResult<BackupEntry> {
        let backups = self.list_backups(file)?;
        if backups.is_empty() {
            return Err(BackupError::NoBackups(basename(file)?).into());
        }
        Self::check_count(count, backups.len())?;

        if file.exists() {
            self.snapshot(file, true)?;
        }

        let chosen = backups[count - 1].clone();
        move_file(&chosen.path, file)?;

        let name = basename(file)?;
        for newer in &backups[..count - 1] {
            let target = self
                .backup_dir
                .join(snapshot_name(newer.timestamp, &name, true));
            move_file(&newer.path, &target)?;
        }

        info!(
            "Restored {} from backup of {}",
            file.display(),
            chosen.timestamp.format(BACKUP_STAMP_FORMAT)
        );
        Ok(chosen)
    }

    /// Reapplies the `count`-th newest redo snapshot (1-based) of `file`.
    ///
    /// The current file is kept as a normal snapshot so the step can be
    /// undone again. Redo snapshots newer than the chosen one become normal
    /// snapshots.
    ///
    /// # Errors
    ///
    /// - `BackupError::NoRedo` if there is nothing to redo
    /// - `BackupError::CountOutOfRange` if `count` is 0 or too large
    /// - `AppError::Path` for filesystem failures
    pub fn redo(&self, file: &Path, count: usize) -> AppResult<BackupEntry> {
        let undone = self.list_undone(file)?;
        if undone.is_empty() {
            return Err(BackupError::NoRedo(basename(file)?).into());
        }
        Self::check_count(count, undone.len())?;

        let has_content = fs::metadata(file).map(|m| m.len() > 0).unwrap_or(false);
        if has_content {
            self.snapshot(file, false)?;
        }

        let name = basename(file)?;
        for skipped in &undone[..count - 1] {
            let target = self
                .backup_dir
                .join(snapshot_name(skipped.timestamp, &name, false));
            move_file(&skipped.path, &target)?;
        }

        let chosen = undone[count - 1].clone();
        move_file(&chosen.path, file)?;
        self.trim(file, self.history_size)?;

        info!(
            "Redid {} from snapshot of {}",
            file.display(),
            chosen.timestamp.format(BACKUP_STAMP_FORMAT)
        );
        Ok(chosen)
    }

    fn labels(&self, entries: &[BackupEntry]) -> Vec<String> {
        let now = self.now();
        entries
            .iter()
            .map(|entry| {
                format!(
                    "{} ({})",
                    relative_time(entry.timestamp, now),
                    entry.timestamp.format("%Y-%m-%d %H:%M:%S")
                )
            })
            .collect()
    }

    /// Lets `chooser` pick a snapshot, then undoes to it.
    ///
    /// # Errors
    ///
    /// Returns `BackupError::SelectionCancelled` if the user backs out, and
    /// otherwise the errors of [`BackupManager::undo`].
    pub fn select_backup(&self, file: &Path, chooser: &dyn BackupChooser) -> AppResult<BackupEntry> {
        let backups = self.list_backups(file)?;
        if backups.is_empty() {
            return Err(BackupError::NoBackups(basename(file)?).into());
        }
        match chooser.choose("Restore which backup?", &self.labels(&backups))? {
            Some(index) => self.undo(file, index + 1),
            None => {
                warn!("Backup selection cancelled");
                Err(BackupError::SelectionCancelled.into())
            }
        }
    }

    /// Lets `chooser` pick a redo snapshot, then redoes to it.
    pub fn select_redo(&self, file: &Path, chooser: &dyn BackupChooser) -> AppResult<BackupEntry> {
        let undone = self.list_undone(file)?;
        if undone.is_empty() {
            return Err(BackupError::NoRedo(basename(file)?).into());
        }
        match chooser.choose("Redo to which state?", &self.labels(&undone))? {
            Some(index) => self.redo(file, index + 1),
            None => {
                warn!("Redo selection cancelled");
                Err(BackupError::SelectionCancelled.into())
            }
        }
    }
}
