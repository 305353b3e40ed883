//! Bulk tag changes on filtered entries.

use crate::backup::BackupManager;
use crate::config::Config;
use crate::errors::{AppResult, ContentError};
use crate::journal_io;
use crate::model::Item;
use crate::query::{filter_items, FilterOptions};
use crate::tags::TagOp;
use tracing::{debug, info};

/// Applies `ops`, in order, to every entry selected by `options`.
///
/// # Flow
///
/// 1. Load the journal and run the filter pipeline
/// 2. Apply the tag operations to a copy of each selected entry
/// 3. Replace the entries whose title changed
/// 4. Write the journal once, only if something changed
///
/// Returns the updated entries; entries the operation left alone are not
/// included.
///
/// # Errors
///
/// Returns an error if:
/// - Nothing matches the filter (`ContentError::NoResults`)
/// - A regex tag name does not compile
/// - Reading or writing the journal fails
pub fn tag_items(
    config: &Config,
    backups: &BackupManager,
    options: &FilterOptions,
    ops: &[TagOp],
) -> AppResult<Vec<Item>> {
    let mut content = journal_io::load_content(&config.journal_file)?;
    let selected: Vec<Item> = filter_items(&content, options)?
        .into_iter()
        .cloned()
        .collect();
    if selected.is_empty() {
        return Err(ContentError::NoResults.into());
    }

    let mut changed = Vec::new();
    for old in &selected {
        let mut new = old.clone();
        for op in ops {
            new.tag(op)?;
        }
        if new.title() == old.title() {
            debug!("No tag change for: {}", old.title());
            continue;
        }
        content.update_item(old, new.clone())?;
        changed.push(new);
    }

    if !changed.is_empty() {
        journal_io::write_content(&config.journal_file, &content, backups)?;
    }
    info!("Tagged {} of {} entries", changed.len(), selected.len());
    Ok(changed)
}
