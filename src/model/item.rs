//! A single timestamped log entry.

use crate::chronify;
use crate::constants::{DONE_TAG, FROM_TAG, ITEM_DATE_FORMAT};
use crate::errors::AppResult;
use crate::model::Note;
use crate::query::Matcher;
use crate::tags::{self, TagOp};
use chrono::{Duration, NaiveDateTime, Timelike};
use std::fmt;

/// One entry of the journal.
///
/// The title never contains a newline; constructors and `set_title` fold
/// newlines into spaces. A single-line title is kept exactly as given. Dates are kept at minute precision because that is
/// all the file format stores.
#[derive(Debug, Clone)]
pub struct Item {
    pub date: NaiveDateTime,
    title: String,
    pub section: String,
    pub note: Note,
}

fn single_line(title: &str) -> String {
    if !title.contains(['\n', '\r']) {
        return title.to_string();
    }
    title
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

fn to_minute(date: NaiveDateTime) -> NaiveDateTime {
    date.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(date)
}

impl Item {
    pub fn new(date: NaiveDateTime, title: &str, section: &str) -> Self {
        Item {
            date: to_minute(date),
            title: single_line(title),
            section: section.to_string(),
            note: Note::new(),
        }
    }

    pub fn with_note(mut self, note: Note) -> Self {
        self.note = note;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = single_line(title);
    }

    /// Applies a tag operation to the title and returns the new title.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidPattern` for a regex operation whose name
    /// does not compile.
    pub fn tag(&mut self, op: &TagOp) -> AppResult<String> {
        self.title = tags::apply(&self.title, op)?;
        Ok(self.title.clone())
    }

    pub fn dedup_tags(&mut self) {
        self.title = tags::dedup(&self.title);
    }

    /// Moves the item to `section`. With `label`, a `@from(previous)` tag is
    /// added unless the item already has one.
    pub fn move_to(&mut self, section: &str, label: bool) {
        let previous = std::mem::replace(&mut self.section, section.to_string());
        if label
            && !previous.eq_ignore_ascii_case(section)
            && !tags::has_tag(&self.title, FROM_TAG)
        {
            let title = tags::apply(&self.title, &TagOp::add(FROM_TAG).with_value(previous));
            if let Ok(title) = title {
                self.title = title;
            }
        }
    }

    /// Structural equality on trimmed title, date and note. The section is
    /// compared only when `match_section` is set.
    pub fn equals(&self, other: &Item, match_section: bool) -> bool {
        self.title.trim() == other.title.trim()
            && self.date == other.date
            && self.note == other.note
            && (!match_section || self.section.eq_ignore_ascii_case(&other.section))
    }

    pub fn tags(&self) -> Vec<String> {
        tags::tag_names(&self.title)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        tags::has_tag(&self.title, name)
    }

    pub fn tag_value(&self, name: &str) -> Option<String> {
        tags::tag_value(&self.title, name)
    }

    pub fn is_finished(&self) -> bool {
        self.has_tag(DONE_TAG)
    }

    /// The `@done` timestamp, if the item has one that parses.
    pub fn end_date(&self) -> Option<NaiveDateTime> {
        let value = self.tag_value(DONE_TAG)?;
        NaiveDateTime::parse_from_str(value.trim(), ITEM_DATE_FORMAT)
            .ok()
            .or_else(|| chronify::chronify(&value, self.date))
    }

    /// Time between start and `@done`. Negative intervals are treated as
    /// missing.
    pub fn interval(&self) -> Option<Duration> {
        let end = self.end_date()?;
        let interval = end - self.date;
        (interval >= Duration::zero()).then_some(interval)
    }

    /// Title and note as one string, what text searches run against.
    pub fn search_text(&self) -> String {
        if self.note.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.title, self.note.to_line())
        }
    }

    /// Whether the title or note matches a compiled search.
    pub fn search(&self, matcher: &Matcher) -> bool {
        matcher.matches_item(self)
    }

    /// The title with every search hit wrapped in `open`/`close`.
    pub fn highlight(&self, matcher: &Matcher, open: &str, close: &str) -> String {
        matcher.highlight(&self.title, open, close)
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\t- {} | {}",
            self.date.format(ITEM_DATE_FORMAT),
            self.title
        )?;
        if !self.note.is_empty() {
            write!(f, "\n{}", self.note)?;
        }
        Ok(())
    }
}
