//! Parsed representation of a whole journal file.
//!
//! The file is a sequence of section headings, each followed by item lines
//! and their indented notes:
//!
//! ```text
//! Currently:
//! 	- 2024-01-01 09:00 | Write the parser @flow
//! 		remember the trailing buffer
//! Archive: @hidden
//! 	- 2023-12-31 17:00 | Ship it @done(2023-12-31 18:00)
//! ```
//!
//! Lines the parser does not model are kept in two opaque buffers so that
//! writing the content back reproduces them. Blank lines are dropped. The
//! output ends with a newline unless the parsed text did not.

use crate::constants::ITEM_DATE_FORMAT;
use crate::errors::{AppResult, ContentError};
use crate::model::{Item, Section};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::debug;


static ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*- (\d{4}-\d{2}-\d{2} \d{2}:\d{2}) \| (.*)$").expect("valid item regex")
});

/// Section that receives items appearing before any heading.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Title accepted by section filters to mean every section.
pub const ALL_SECTIONS: &str = "All";

/// Sections, items, and the unrecognized text around them.
#[derive(Debug, Clone, Default)]
pub struct Content {
    leading: Vec<String>,
    sections: Vec<Section>,
    items: Vec<Item>,
    trailing: Vec<String>,
    missing_final_newline: bool,
}

impl Content {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses journal text. Never fails: lines that are neither headings,
    /// items nor notes end up in the leading or trailing buffer.
    pub fn parse(text: &str) -> Self {
        let mut content = Content::new();
        content.missing_final_newline = !text.is_empty() && !text.ends_with('\n');
        let mut current: Option<String> = None;
        let mut items_in_section = 0usize;

        for line in text.lines() {
            if let Some(section) = Section::from_heading(line) {
                let title = section.title.clone();
                if content.section(&title).is_none() {
                    content.sections.push(section);
                }
                current = Some(title);
                items_in_section = 0;
                continue;
            }

            if let Some(caps) = ITEM_RE.captures(line) {
                if let Ok(date) = NaiveDateTime::parse_from_str(&caps[1], ITEM_DATE_FORMAT) {
                    let section = match &current {
                        Some(title) => title.clone(),
                        None => {
                            content.add_section(UNCATEGORIZED);
                            current = Some(UNCATEGORIZED.to_string());
                            UNCATEGORIZED.to_string()
                        }
                    };
                    content.items.push(Item::new(date, &caps[2], &section));
                    items_in_section += 1;
                    continue;
                }
            }

            if line.trim().is_empty() {
                continue;
            }

            if items_in_section == 0 {
                content.leading.push(line.to_string());
            } else if line.starts_with(|c: char| !c.is_whitespace()) {
                content.trailing.push(line.to_string());
            } else if let Some(item) = content.items.last_mut() {
                item.note.add(line, false);
            }
        }

        debug!(
            "Parsed {} sections and {} items",
            content.sections.len(),
            content.items.len()
        );
        content
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_titles(&self) -> Vec<String> {
        self.sections.iter().map(|s| s.title.clone()).collect()
    }

    /// Exact (case-insensitive) section lookup.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.is(title))
    }

    /// Section lookup that falls back to a prefix and then a substring match.
    pub fn find_section(&self, query: &str) -> Option<&Section> {
        let needle = query.trim().to_lowercase();
        self.section(query)
            .or_else(|| {
                self.sections
                    .iter()
                    .find(|s| s.title.to_lowercase().starts_with(&needle))
            })
            .or_else(|| {
                self.sections
                    .iter()
                    .find(|s| s.title.to_lowercase().contains(&needle))
            })
    }

    /// Adds a section unless one with the same title exists. Returns the
    /// section either way.
    pub fn add_section(&mut self, title: &str) -> &Section {
        let index = match self.sections.iter().position(|s| s.is(title)) {
            Some(index) => index,
            None => {
                debug!("Adding section {}", title);
                self.sections.push(Section::new(title));
                self.sections.len() - 1
            }
        };
        &self.sections[index]
    }

    /// Removes a section and returns the items it held.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::SectionNotFound` if no such section exists.
    pub fn delete_section(&mut self, title: &str) -> AppResult<Vec<Item>> {
        let index = self
            .sections
            .iter()
            .position(|s| s.is(title))
            .ok_or_else(|| ContentError::SectionNotFound(title.to_string()))?;
        let section = self.sections.remove(index);

        let (removed, kept): (Vec<Item>, Vec<Item>) = std::mem::take(&mut self.items)
            .into_iter()
            .partition(|item| section.is(&item.section));
        self.items = kept;
        Ok(removed)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [Item] {
        &mut self.items
    }

    /// Items of one section in file order, or all items for `All`.
    pub fn in_section(&self, title: &str) -> Vec<&Item> {
        if title.eq_ignore_ascii_case(ALL_SECTIONS) {
            return self.items.iter().collect();
        }
        self.items
            .iter()
            .filter(|item| item.section.eq_ignore_ascii_case(title.trim()))
            .collect()
    }

    /// The most recently dated item of a section (or of all sections).
    pub fn last_item(&self, section: &str) -> Option<&Item> {
        self.in_section(section)
            .into_iter()
            .max_by_key(|item| item.date)
    }

    /// Appends an item, creating its section if needed.
    pub fn push(&mut self, item: Item) {
        let title = self.add_section(&item.section).title.clone();
        let mut item = item;
        item.section = title;
        self.items.push(item);
    }

    fn position(&self, item: &Item) -> AppResult<usize> {
        self.items
            .iter()
            .position(|candidate| candidate.equals(item, true))
            .ok_or_else(|| ContentError::ItemNotFound(item.title().to_string()).into())
    }

    /// Replaces the first item equal to `old` (section included) by `new`.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::ItemNotFound` if `old` is not present.
    pub fn update_item(&mut self, old: &Item, new: Item) -> AppResult<()> {
        let index = self.position(old)?;
        if self.section(&new.section).is_none() {
            self.add_section(&new.section);
        }
        self.items[index] = new;
        Ok(())
    }

    /// Removes the first item equal to `item` (section included).
    ///
    /// # Errors
    ///
    /// Returns `ContentError::ItemNotFound` if the item is not present.
    pub fn delete_item(&mut self, item: &Item) -> AppResult<Item> {
        let index = self.position(item)?;
        Ok(self.items.remove(index))
    }
}

impl fmt::Display for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lines: Vec<String> = self.leading.clone();
        for section in &self.sections {
            lines.push(section.original.clone());
            lines.extend(
                self.items
                    .iter()
                    .filter(|item| section.is(&item.section))
                    .map(Item::to_string),
            );
        }
        lines.extend(self.trailing.iter().cloned());

        if lines.is_empty() {
            return Ok(());
        }
        if self.missing_final_newline {
            write!(f, "{}", lines.join("\n"))
        } else {
            writeln!(f, "{}", lines.join("\n"))
        }
    }
}
