//! Listing entries that pass a filter.

use crate::config::Config;
use crate::constants::ITEM_DATE_FORMAT;
use crate::errors::{AppError, AppResult, ContentError};
use crate::journal_io;
use crate::model::Item;
use crate::query::{filter_items, FilterOptions, Matcher};
use serde::Serialize;
use tracing::debug;

/// Output format for `show_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// One entry as emitted by `--json`.
#[derive(Debug, Serialize)]
pub struct ItemRecord<'a> {
    pub date: String,
    pub title: &'a str,
    pub section: &'a str,
    pub note: &'a [String],
    pub tags: Vec<String>,
    pub done: bool,
    /// Minutes between start and `@done`, if finished.
    pub interval: Option<i64>,
}

impl<'a> From<&'a Item> for ItemRecord<'a> {
    fn from(item: &'a Item) -> Self {
        ItemRecord {
            date: item.date.format(ITEM_DATE_FORMAT).to_string(),
            title: item.title(),
            section: &item.section,
            note: item.note.lines(),
            tags: item.tags(),
            done: item.is_finished(),
            interval: item.interval().map(|d| d.num_minutes()),
        }
    }
}

/// Renders items as `date | title` lines, notes indented below.
///
/// With a search `highlight` matcher, hits in the title are wrapped in
/// `[` and `]`.
pub fn render_text(items: &[&Item], highlight: Option<&Matcher>) -> String {
    let mut out = String::new();
    for item in items {
        let title = match highlight {
            Some(matcher) => item.highlight(matcher, "[", "]"),
            None => item.title().to_string(),
        };
        out.push_str(&format!(
            "{} | {}\n",
            item.date.format(ITEM_DATE_FORMAT),
            title
        ));
        for line in item.note.lines() {
            out.push_str(&format!("    {}\n", line));
        }
    }
    out
}

/// Renders items as a pretty-printed JSON array.
///
/// # Errors
///
/// Returns `AppError::Io` if serialization fails.
pub fn render_json(items: &[&Item]) -> AppResult<String> {
    let records: Vec<ItemRecord> = items.iter().map(|item| ItemRecord::from(*item)).collect();
    serde_json::to_string_pretty(&records)
        .map_err(|e| AppError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Loads the journal and renders the entries that pass `options`.
///
/// # Flow
///
/// 1. Load the journal
/// 2. Run the filter pipeline (section, tags, search, values, dates,
///    count/age/sort)
/// 3. Render the survivors in the requested format
///
/// # Errors
///
/// Returns an error if:
/// - The journal cannot be read
/// - The named section does not exist (`ContentError::SectionNotFound`)
/// - Nothing matches (`ContentError::NoResults`)
pub fn show_items(
    config: &Config,
    options: &FilterOptions,
    format: OutputFormat,
) -> AppResult<String> {
    let content = journal_io::load_content(&config.journal_file)?;
    let items = filter_items(&content, options)?;
    debug!("{} items matched", items.len());
    if items.is_empty() {
        return Err(ContentError::NoResults.into());
    }

    match format {
        OutputFormat::Text => Ok(render_text(&items, options.search.as_ref())),
        OutputFormat::Json => render_json(&items),
    }
}
