//! Query engine: pure predicates over items.
//!
//! Each filter kind lives in its own module and can be used alone:
//!
//! - `tag_filter`: boolean combinations of tag tokens
//! - `search`: fuzzy, exact and regex text search with highlighting
//! - `phrase`: `+must -must_not should "quoted phrase"` term queries
//! - `value`: `@tag OP value` comparisons, date and number aware
//! - `filter`: composes all of the above with date ranges, sections and the
//!   count/age/sort selection policy
//!
//! Search defaults that used to be ambient state travel in a `QueryContext`.

pub mod filter;
pub mod phrase;
pub mod search;
pub mod tag_filter;
pub mod value;

use crate::constants::DEFAULT_FUZZY_DISTANCE;
use crate::errors::{AppError, QueryError};
use chrono::{Local, NaiveDateTime};
use std::str::FromStr;

pub use filter::{filter_items, Age, Completion, DateRange, FilterOptions, SortOrder};
pub use phrase::{Clause, Operator, PhraseQuery, Term};
pub use search::Matcher;
pub use tag_filter::TagFilter;
pub use value::{CompareOp, ValueFilter, ValueQuery, ValueRhs};

/// How letter case affects text matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    /// Case-sensitive only when the query contains an uppercase letter.
    #[default]
    Smart,
    Sensitive,
    Ignore,
}

impl Case {
    /// Resolves the rule for a concrete query string.
    pub fn is_sensitive(self, query: &str) -> bool {
        match self {
            Case::Smart => query.chars().any(char::is_uppercase),
            Case::Sensitive => true,
            Case::Ignore => false,
        }
    }
}

impl FromStr for Case {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "smart" | "s" => Ok(Case::Smart),
            "sensitive" | "c" | "case" => Ok(Case::Sensitive),
            "ignore" | "i" | "insensitive" => Ok(Case::Ignore),
            other => Err(QueryError::InvalidCase(other.to_string()).into()),
        }
    }
}

/// Default interpretation of a search string that carries no `/re/` or
/// `'exact` marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Matching {
    #[default]
    Fuzzy,
    Exact,
    /// `+must -must_not should` phrase syntax.
    Pattern,
}

impl FromStr for Matching {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fuzzy" => Ok(Matching::Fuzzy),
            "exact" => Ok(Matching::Exact),
            "pattern" => Ok(Matching::Pattern),
            other => Err(AppError::Config(format!(
                "Invalid search matching '{}'. Use fuzzy, exact or pattern",
                other
            ))),
        }
    }
}

/// How a list of filters combines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bool {
    And,
    Or,
    Not,
    /// `+must` / `-must_not` prefixes, bare tokens are alternatives.
    #[default]
    Pattern,
}

impl FromStr for Bool {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "and" | "all" => Ok(Bool::And),
            "or" | "any" => Ok(Bool::Or),
            "not" | "none" => Ok(Bool::Not),
            "pattern" => Ok(Bool::Pattern),
            other => Err(QueryError::InvalidBool(other.to_string()).into()),
        }
    }
}

/// Search defaults and the reference time for relative dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryContext {
    pub distance: usize,
    pub case: Case,
    pub matching: Matching,
    pub now: NaiveDateTime,
}

impl QueryContext {
    pub fn new(now: NaiveDateTime) -> Self {
        QueryContext {
            distance: DEFAULT_FUZZY_DISTANCE,
            case: Case::default(),
            matching: Matching::default(),
            now,
        }
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        QueryContext::new(Local::now().naive_local())
    }
}
