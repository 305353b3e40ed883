//! Adding entries and marking them done.

use crate::backup::BackupManager;
use crate::chronify;
use crate::config::Config;
use crate::constants::{DONE_TAG, ITEM_DATE_FORMAT};
use crate::content::{Content, ALL_SECTIONS};
use crate::editor::Editor;
use crate::errors::{AppResult, ContentError, QueryError};
use crate::journal_io;
use crate::model::{Item, Note};
use crate::tags::TagOp;
use chrono::NaiveDateTime;
use tracing::{debug, info};

/// Options for a new entry.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Section title or prefix; the configured default when unset.
    pub section: Option<String>,
    pub note: Option<String>,
    /// Natural-language start time such as `30 minutes ago`.
    pub back: Option<String>,
    /// Add `@done` with the current time.
    pub finish: bool,
}

fn resolve_section(content: &Content, requested: Option<&str>, config: &Config) -> String {
    let requested = requested.unwrap_or(&config.default_section);
    content
        .find_section(requested)
        .map(|section| section.title.clone())
        .unwrap_or_else(|| requested.trim().to_string())
}

fn done_tag(at: NaiveDateTime) -> TagOp {
    TagOp::add(DONE_TAG).with_value(at.format(ITEM_DATE_FORMAT).to_string())
}

/// Splits editor output into a title line and note lines.
fn split_entry(text: &str) -> (String, Vec<String>) {
    let mut lines = text.lines().map(str::trim_end).skip_while(|l| l.trim().is_empty());
    let title = lines.next().unwrap_or_default().trim().to_string();
    let note = lines
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.trim().to_string())
        .collect();
    (title, note)
}

/// Adds an entry and saves the journal.
///
/// # Flow
///
/// 1. Load the journal
/// 2. Resolve the start time from `options.back`, or use `now`
/// 3. With an editor, let the user compose the entry: the first line is the
///    title, the rest becomes the note
/// 4. Append the item to its section, creating the section if needed
/// 5. Write the journal, snapshotting the previous version
///
/// # Arguments
///
/// * `config` - Application configuration
/// * `backups` - Snapshot manager guarding the write
/// * `editor` - Optional editor for composing the entry
/// * `title` - Entry title; may carry `@tags`
/// * `options` - Section, note, start time and completion
/// * `now` - Reference time
///
/// # Errors
///
/// Returns an error if:
/// - The title is empty after editing (`ContentError::EmptyEntry`)
/// - `options.back` does not parse (`QueryError::InvalidDate`)
/// - The editor fails
/// - Reading or writing the journal fails
pub fn add_entry(
    config: &Config,
    backups: &BackupManager,
    editor: Option<&dyn Editor>,
    title: &str,
    options: &AddOptions,
    now: NaiveDateTime,
) -> AppResult<Item> {
    let mut content = journal_io::load_content(&config.journal_file)?;

    let date = match options.back.as_deref() {
        Some(back) => chronify::chronify(back, now)
            .ok_or_else(|| QueryError::InvalidDate(back.to_string()))?,
        None => now,
    };

    let (title, mut note_lines) = match editor {
        Some(editor) => {
            let seed = match options.note.as_deref() {
                Some(note) => format!("{}\n{}\n", title, note),
                None => format!("{}\n", title),
            };
            split_entry(&editor.edit(&seed)?)
        }
        None => (title.trim().to_string(), Vec::new()),
    };
    if title.is_empty() {
        return Err(ContentError::EmptyEntry.into());
    }
    if editor.is_none() {
        if let Some(note) = options.note.as_deref() {
            note_lines.extend(note.lines().map(str::to_string));
        }
    }

    let section = resolve_section(&content, options.section.as_deref(), config);
    let mut note = Note::new();
    note.add_lines(&note_lines, false);
    let mut item = Item::new(date, &title, &section).with_note(note);
    item.dedup_tags();
    if options.finish {
        item.tag(&done_tag(now))?;
    }

    debug!("Adding entry to {}", section);
    content.push(item.clone());
    journal_io::write_content(&config.journal_file, &content, backups)?;
    info!("Added entry: {}", item.title());
    Ok(item)
}

/// Marks the most recent entry of a section as done.
///
/// An entry that is already finished is returned unchanged and the journal
/// is not rewritten.
///
/// # Arguments
///
/// * `section` - Section title or prefix, `All` for every section; the
///   configured default when unset
///
/// # Errors
///
/// Returns `ContentError::SectionNotFound` for an unknown section and
/// `ContentError::NoResults` if the section is empty.
pub fn finish_last(
    config: &Config,
    backups: &BackupManager,
    section: Option<&str>,
    now: NaiveDateTime,
) -> AppResult<Item> {
    let mut content = journal_io::load_content(&config.journal_file)?;
    let requested = section.unwrap_or(&config.default_section);

    let title = if requested.trim().eq_ignore_ascii_case(ALL_SECTIONS) {
        ALL_SECTIONS.to_string()
    } else {
        content
            .find_section(requested)
            .map(|s| s.title.clone())
            .ok_or_else(|| ContentError::SectionNotFound(requested.to_string()))?
    };

    let last = content
        .last_item(&title)
        .cloned()
        .ok_or(ContentError::NoResults)?;
    if last.is_finished() {
        debug!("Last entry is already done");
        return Ok(last);
    }

    let mut finished = last.clone();
    finished.tag(&done_tag(now))?;
    content.update_item(&last, finished.clone())?;
    journal_io::write_content(&config.journal_file, &content, backups)?;
    info!("Finished entry: {}", finished.title());
    Ok(finished)
}
