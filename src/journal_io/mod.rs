//! Reading and writing the journal file.
//!
//! Loading never fails for a missing file; it yields empty content. Writing
//! asks the backup manager to snapshot the previous file and then replaces
//! the journal atomically, so a crash mid-write leaves either the old or the
//! new file in place.

use crate::backup::BackupManager;
use crate::content::Content;
use crate::errors::{AppError, AppResult};
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Reads and parses the journal at `path`.
///
/// # Errors
///
/// Returns `AppError::Path` if the file exists but cannot be read.
pub fn load_content(path: &Path) -> AppResult<Content> {
    if !path.exists() {
        debug!("Journal {} does not exist yet", path.display());
        return Ok(Content::new());
    }
    let text = fs::read_to_string(path).map_err(|e| AppError::path(path, e))?;
    let content = Content::parse(&text);
    debug!(
        "Loaded {} items in {} sections from {}",
        content.items().len(),
        content.sections().len(),
        path.display()
    );
    Ok(content)
}

/// Creates the parent directory of `path` if needed.
///
/// # Errors
///
/// Returns `AppError::Path` if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> AppResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).map_err(|e| AppError::path(parent, e))?;
            debug!("Created directory {}", parent.display());
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Replaces `path` with `text` via a temporary file in the same directory.
///
/// On Unix the result is readable and writable by the owner only.
///
/// # Errors
///
/// Returns `AppError::Path` if the temporary file cannot be written or
/// renamed over `path`.
pub fn atomic_write(path: &Path, text: &str) -> AppResult<()> {
    ensure_parent_dir(path)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(|e| AppError::path(dir, e))?;
    temp.write_all(text.as_bytes())
        .and_then(|_| temp.as_file().sync_all())
        .map_err(|e| AppError::path(temp.path(), e))?;

    #[cfg(unix)]
    {
        fs::set_permissions(temp.path(), fs::Permissions::from_mode(0o600))
            .map_err(|e| AppError::path(temp.path(), e))?;
    }

    temp.persist(path)
        .map_err(|e| AppError::path(path, e.error))?;
    Ok(())
}

/// Serializes `content` to `path`, snapshotting the previous file first.
///
/// # Errors
///
/// Propagates backup and write failures; the journal is untouched if the
/// snapshot cannot be taken.
pub fn write_content(path: &Path, content: &Content, backups: &BackupManager) -> AppResult<()> {
    backups.write_backup(path)?;
    atomic_write(path, &content.to_string())?;
    info!("Wrote {} items to {}", content.items().len(), path.display());
    Ok(())
}
