//! Composition of the individual filters and the selection policy.
//!
//! Every filter in `FilterOptions` is optional; the ones that are set must
//! all pass. Survivors are ordered by date, `count` of them are taken from
//! the end named by `age`, and the result is put in `sort` order.

use crate::chronify;
use crate::content::{Content, ALL_SECTIONS};
use crate::errors::{AppError, AppResult, ContentError, QueryError};
use crate::model::Item;
use crate::query::{Matcher, TagFilter, ValueFilter};
use chrono::{Days, Local, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;
use tracing::debug;

static RANGE_SPLIT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s+(?:to|through|thru|until|til|-)\s+").expect("valid range regex")
});

/// Which end of the date ordering a count limit takes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Age {
    Oldest,
    #[default]
    Newest,
}

impl FromStr for Age {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oldest" | "old" | "o" => Ok(Age::Oldest),
            "newest" | "new" | "n" => Ok(Age::Newest),
            other => Err(AppError::Config(format!(
                "Invalid age '{}'. Use oldest or newest",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for SortOrder {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "a" => Ok(SortOrder::Asc),
            "desc" | "d" => Ok(SortOrder::Desc),
            other => Err(AppError::Config(format!(
                "Invalid sort order '{}'. Use asc or desc",
                other
            ))),
        }
    }
}

/// Filter on the `@done` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Completion {
    #[default]
    Any,
    Finished,
    Unfinished,
}

impl Completion {
    fn matches(self, item: &Item) -> bool {
        match self {
            Completion::Any => true,
            Completion::Finished => item.is_finished(),
            Completion::Unfinished => !item.is_finished(),
        }
    }
}

/// A half-open span of time, `start <= date < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

fn start_of(date: NaiveDateTime) -> NaiveDateTime {
    date.date().and_time(NaiveTime::MIN)
}

fn day_after(date: NaiveDateTime) -> NaiveDateTime {
    start_of(date)
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDateTime::MAX)
}

impl DateRange {
    /// Parses `X to Y` (also `through`, `thru`, `until`, `-`), or a single
    /// expression.
    ///
    /// A day without a time covers the whole day: `yesterday` alone is
    /// midnight to midnight, and `monday to wednesday` includes all of
    /// Wednesday. A single instant such as `3 hours ago` starts an
    /// open-ended range.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidDate` if either end does not parse.
    pub fn parse(input: &str, now: NaiveDateTime) -> AppResult<Self> {
        let resolve = |text: &str| -> AppResult<NaiveDateTime> {
            chronify::chronify(text, now)
                .ok_or_else(|| QueryError::InvalidDate(text.trim().to_string()).into())
        };

        let parts: Vec<&str> = RANGE_SPLIT_RE.splitn(input.trim(), 2).collect();
        let range = match parts.as_slice() {
            [start, end] => {
                let start_date = resolve(start)?;
                let end_date = resolve(end)?;
                let start_date = if chronify::is_day_only(start, now) {
                    start_of(start_date)
                } else {
                    start_date
                };
                let end_date = if chronify::is_day_only(end, now) {
                    day_after(end_date)
                } else {
                    end_date
                };
                DateRange {
                    start: start_date,
                    end: end_date,
                }
            }
            _ => {
                let date = resolve(input)?;
                if chronify::is_day_only(input, now) {
                    DateRange {
                        start: start_of(date),
                        end: day_after(date),
                    }
                } else {
                    DateRange {
                        start: date,
                        end: NaiveDateTime::MAX,
                    }
                }
            }
        };
        debug!("Date range {} to {}", range.start, range.end);
        Ok(range)
    }

    pub fn contains(&self, date: NaiveDateTime) -> bool {
        self.start <= date && date < self.end
    }
}

/// Everything a query can ask for. Unset filters pass every item.
#[derive(Debug, Clone)]
pub struct FilterOptions {
    /// Section title or unique prefix; `None` or `All` means every section.
    pub section: Option<String>,
    pub tags: Option<TagFilter>,
    pub search: Option<Matcher>,
    pub values: Option<ValueFilter>,
    pub date_range: Option<DateRange>,
    pub completion: Completion,
    pub count: Option<usize>,
    pub age: Age,
    pub sort: SortOrder,
    /// Reference time for value queries.
    pub now: NaiveDateTime,
}

impl Default for FilterOptions {
    fn default() -> Self {
        FilterOptions {
            section: None,
            tags: None,
            search: None,
            values: None,
            date_range: None,
            completion: Completion::Any,
            count: None,
            age: Age::default(),
            sort: SortOrder::default(),
            now: Local::now().naive_local(),
        }
    }
}

impl FilterOptions {
    /// Whether `item` passes every configured filter. Section and selection
    /// policy are not considered here.
    pub fn matches(&self, item: &Item) -> bool {
        self.completion.matches(item)
            && self.tags.as_ref().map_or(true, |f| f.matches(item))
            && self.search.as_ref().map_or(true, |m| m.matches_item(item))
            && self.values.as_ref().map_or(true, |v| v.matches(item, self.now))
            && self.date_range.map_or(true, |r| r.contains(item.date))
    }
}

/// Runs a query over `content`.
///
/// # Errors
///
/// Returns `ContentError::SectionNotFound` when `options.section` names no
/// section.
///
/// # Examples
///
/// ```
/// use logbook::content::Content;
/// use logbook::query::{filter_items, Age, FilterOptions};
///
/// let content = Content::parse(
///     "Currently:\n\t- 2024-01-01 09:00 | first\n\t- 2024-01-01 10:00 | second\n\t- 2024-01-01 11:00 | third\n",
/// );
/// let options = FilterOptions { count: Some(2), age: Age::Oldest, ..Default::default() };
/// let titles: Vec<&str> = filter_items(&content, &options)
///     .unwrap()
///     .iter()
///     .map(|item| item.title())
///     .collect();
/// assert_eq!(titles, vec!["first", "second"]);
/// ```
pub fn filter_items<'a>(content: &'a Content, options: &FilterOptions) -> AppResult<Vec<&'a Item>> {
    let section = match options.section.as_deref() {
        None => None,
        Some(title) if title.trim().eq_ignore_ascii_case(ALL_SECTIONS) => None,
        Some(title) => Some(
            content
                .find_section(title)
                .ok_or_else(|| ContentError::SectionNotFound(title.to_string()))?,
        ),
    };

    let mut items: Vec<&Item> = content
        .items()
        .iter()
        .filter(|item| section.map_or(true, |s| s.is(&item.section)))
        .filter(|item| options.matches(item))
        .collect();
    items.sort_by_key(|item| item.date);

    if let Some(count) = options.count {
        if items.len() > count {
            items = match options.age {
                Age::Oldest => items[..count].to_vec(),
                Age::Newest => items[items.len() - count..].to_vec(),
            };
        }
    }

    if options.sort == SortOrder::Desc {
        items.reverse();
    }

    debug!("Query selected {} items", items.len());
    Ok(items)
}
