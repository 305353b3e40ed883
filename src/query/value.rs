//! Value queries: `@tag OP value`.
//!
//! The right-hand side decides how the comparison runs:
//!
//! - an age (`two hours ago`, `90m`) compares how long ago the left-hand
//!   date was, relative to the query's "now"
//! - an absolute or natural-language date compares dates
//! - a number compares the first number found in the tag value
//! - anything else compares text, case-insensitively unless the value has
//!   an uppercase letter
//!
//! Without an `@`, `date`, `title`, `note` and `duration` name properties of
//! the item itself; any other bare word is read as a tag name.

use crate::chronify;
use crate::constants::ITEM_DATE_FORMAT;
use crate::errors::{AppResult, QueryError};
use crate::model::Item;
use crate::query::Bool;
use crate::tags::{is_case_sensitive, TokenOp, ValueMatcher};
use chrono::{Duration, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

static QUERY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<field>@?[\w\-.*?]+)\s*(?P<op><=|>=|==|!=|\*=|\^=|\$=|<|>|=)\s*(?P<rhs>.*?)\s*$",
    )
    .expect("valid value query regex")
});

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(?:\.\d+)?").expect("valid number regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    /// `*=`
    Contains,
    /// `^=`
    StartsWith,
    /// `$=`
    EndsWith,
}

impl CompareOp {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Le => ordering != Ordering::Greater,
            CompareOp::Ge => ordering != Ordering::Less,
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::Ne => ordering != Ordering::Equal,
            CompareOp::Contains | CompareOp::StartsWith | CompareOp::EndsWith => false,
        }
    }

    fn is_textual(self) -> bool {
        matches!(
            self,
            CompareOp::Contains | CompareOp::StartsWith | CompareOp::EndsWith
        )
    }
}

impl FromStr for CompareOp {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "<" => Ok(CompareOp::Lt),
            ">" => Ok(CompareOp::Gt),
            "<=" => Ok(CompareOp::Le),
            ">=" => Ok(CompareOp::Ge),
            "==" | "=" => Ok(CompareOp::Eq),
            "!=" => Ok(CompareOp::Ne),
            "*=" => Ok(CompareOp::Contains),
            "^=" => Ok(CompareOp::StartsWith),
            "$=" => Ok(CompareOp::EndsWith),
            other => Err(QueryError::InvalidOperator(other.to_string())),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            CompareOp::Lt => "<",
            CompareOp::Gt => ">",
            CompareOp::Le => "<=",
            CompareOp::Ge => ">=",
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Contains => "*=",
            CompareOp::StartsWith => "^=",
            CompareOp::EndsWith => "$=",
        };
        f.write_str(symbol)
    }
}

/// What a value query looks at on the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Tag(String),
    Date,
    Title,
    Note,
    /// Time between the item's start and its `@done` date.
    Duration,
}

impl Field {
    fn parse(field: &str) -> Self {
        if let Some(tag) = field.strip_prefix('@') {
            return Field::Tag(tag.to_string());
        }
        match field.to_lowercase().as_str() {
            "date" | "start" => Field::Date,
            "title" => Field::Title,
            "note" => Field::Note,
            "duration" | "interval" => Field::Duration,
            _ => Field::Tag(field.to_string()),
        }
    }
}

/// The interpreted right-hand side of a value query.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueRhs {
    /// Elapsed time, from `X ago` or a bare duration.
    Age(Duration),
    Date(NaiveDateTime),
    Number(f64),
    Text(String),
}

impl ValueRhs {
    /// Interprets `raw` against `now`. A bare number stays a number even
    /// when it could be read as a date.
    pub fn interpret(raw: &str, now: NaiveDateTime) -> Self {
        let text = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
        if let Some(age) = chronify::parse_ago(text).or_else(|| chronify::parse_duration(text)) {
            return ValueRhs::Age(age);
        }
        if let Ok(number) = text.parse::<f64>() {
            return ValueRhs::Number(number);
        }
        if let Some(date) = chronify::chronify(text, now) {
            return ValueRhs::Date(date);
        }
        ValueRhs::Text(text.to_string())
    }
}

/// One parsed `field OP value` comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueQuery {
    pub field: Field,
    pub op: CompareOp,
    pub rhs: ValueRhs,
    /// The right-hand side as written, used by the text operators.
    pub raw: String,
}

impl ValueQuery {
    /// Parses a query, resolving relative dates against `now`.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::InvalidValueQuery` when the input is not of the
    /// form `field OP value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::NaiveDate;
    /// use logbook::query::{CompareOp, ValueQuery, ValueRhs};
    ///
    /// let now = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(9, 0, 0).unwrap();
    /// let query = ValueQuery::parse("@progress >= 50", now).unwrap();
    /// assert_eq!(query.op, CompareOp::Ge);
    /// assert_eq!(query.rhs, ValueRhs::Number(50.0));
    /// ```
    pub fn parse(input: &str, now: NaiveDateTime) -> AppResult<Self> {
        let caps = QUERY_RE
            .captures(input)
            .ok_or_else(|| QueryError::InvalidValueQuery(input.to_string()))?;
        let raw = caps["rhs"]
            .trim_matches(|c| c == '"' || c == '\'')
            .to_string();
        if raw.is_empty() {
            return Err(QueryError::InvalidValueQuery(input.to_string()).into());
        }
        let op: CompareOp = caps["op"].parse()?;
        let rhs = ValueRhs::interpret(&raw, now);
        debug!("Value query {} {} {:?}", &caps["field"], op, rhs);
        Ok(ValueQuery {
            field: Field::parse(&caps["field"]),
            op,
            rhs,
            raw,
        })
    }

    /// Evaluates the query for `item` at `now`. Items lacking the tag never
    /// match.
    pub fn matches(&self, item: &Item, now: NaiveDateTime) -> bool {
        let lhs = match &self.field {
            Field::Tag(name) => match item.tag_value(name) {
                Some(value) => Lhs::Text(value),
                None => return false,
            },
            Field::Date => Lhs::Date(item.date),
            Field::Title => Lhs::Text(item.title().to_string()),
            Field::Note => Lhs::Text(item.note.to_line()),
            Field::Duration => match item.interval() {
                Some(interval) => Lhs::Duration(interval),
                None => return false,
            },
        };

        if self.op.is_textual() {
            return compare_text(&lhs.to_text(), self.op, &self.raw);
        }

        match (&self.rhs, &lhs) {
            (ValueRhs::Age(age), Lhs::Duration(have)) => self.op.holds(have.cmp(age)),
            (ValueRhs::Age(age), _) => {
                if let Some(date) = lhs.to_date(item) {
                    // an age reaching past the calendar is older than any date
                    let ordering = match now.checked_sub_signed(*age) {
                        Some(cutoff) => cutoff.cmp(&date),
                        None => Ordering::Less,
                    };
                    return self.op.holds(ordering);
                }
                match lhs.to_duration() {
                    Some(have) => self.op.holds(have.cmp(age)),
                    None => false,
                }
            }
            (ValueRhs::Date(want), _) => match lhs.to_date(item) {
                Some(date) => self.op.holds(date.cmp(want)),
                None => false,
            },
            (ValueRhs::Number(want), _) => match lhs.to_number() {
                Some(have) => have
                    .partial_cmp(want)
                    .map(|ordering| self.op.holds(ordering))
                    .unwrap_or(false),
                None => false,
            },
            (ValueRhs::Text(want), _) => compare_text(&lhs.to_text(), self.op, want),
        }
    }
}

enum Lhs {
    Text(String),
    Date(NaiveDateTime),
    Duration(Duration),
}

impl Lhs {
    fn to_text(&self) -> String {
        match self {
            Lhs::Text(text) => text.clone(),
            Lhs::Date(date) => date.format(ITEM_DATE_FORMAT).to_string(),
            Lhs::Duration(d) => format!("{}m", d.num_minutes()),
        }
    }

    /// Tag values are dated relative to the item's own start.
    fn to_date(&self, item: &Item) -> Option<NaiveDateTime> {
        match self {
            Lhs::Date(date) => Some(*date),
            Lhs::Text(text) => NaiveDateTime::parse_from_str(text.trim(), ITEM_DATE_FORMAT)
                .ok()
                .or_else(|| chronify::chronify(text, item.date)),
            Lhs::Duration(_) => None,
        }
    }

    fn to_duration(&self) -> Option<Duration> {
        match self {
            Lhs::Duration(d) => Some(*d),
            Lhs::Text(text) => chronify::parse_duration(text),
            Lhs::Date(_) => None,
        }
    }

    fn to_number(&self) -> Option<f64> {
        match self {
            Lhs::Text(text) => NUMBER_RE.find(text)?.as_str().parse().ok(),
            Lhs::Duration(d) => Some(d.num_minutes() as f64),
            Lhs::Date(_) => None,
        }
    }
}

fn compare_text(have: &str, op: CompareOp, want: &str) -> bool {
    let (have, want) = if is_case_sensitive(want) {
        (have.trim().to_string(), want.to_string())
    } else {
        (have.trim().to_lowercase(), want.to_lowercase())
    };
    match op {
        CompareOp::Contains => have.contains(&want),
        CompareOp::StartsWith => have.starts_with(&want),
        CompareOp::EndsWith => have.ends_with(&want),
        CompareOp::Eq | CompareOp::Ne if want.contains(['*', '?']) => {
            let hit = ValueMatcher::new(&want)
                .map(|m| m.is_match(&have))
                .unwrap_or(false);
            hit == (op == CompareOp::Eq)
        }
        _ => op.holds(have.cmp(&want)),
    }
}

/// Several value queries combined with a `Bool`.
#[derive(Debug, Clone)]
pub struct ValueFilter {
    queries: Vec<(TokenOp, ValueQuery)>,
    mode: Bool,
}

impl ValueFilter {
    /// Parses each query. In `Bool::Pattern` mode a leading `+` or `-`
    /// marks a query as required or forbidden.
    pub fn new<S: AsRef<str>>(queries: &[S], mode: Bool, now: NaiveDateTime) -> AppResult<Self> {
        let queries = queries
            .iter()
            .map(|query| {
                let query = query.as_ref().trim();
                let (op, rest) = match query.chars().next() {
                    Some('+') => (TokenOp::Must, &query[1..]),
                    Some('-') => (TokenOp::MustNot, &query[1..]),
                    _ => (TokenOp::Should, query),
                };
                Ok((op, ValueQuery::parse(rest, now)?))
            })
            .collect::<AppResult<Vec<_>>>()?;
        Ok(ValueFilter { queries, mode })
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    pub fn matches(&self, item: &Item, now: NaiveDateTime) -> bool {
        if self.queries.is_empty() {
            return true;
        }
        let mut hits = self
            .queries
            .iter()
            .map(|(op, query)| (*op, query.matches(item, now)));
        match self.mode {
            Bool::And => hits.all(|(_, hit)| hit),
            Bool::Or => hits.any(|(_, hit)| hit),
            Bool::Not => !hits.any(|(_, hit)| hit),
            Bool::Pattern => {
                let mut must_seen = false;
                let mut should_seen = false;
                let mut should_hit = false;
                for (op, hit) in hits {
                    match op {
                        TokenOp::Must => {
                            must_seen = true;
                            if !hit {
                                return false;
                            }
                        }
                        TokenOp::MustNot if hit => return false,
                        TokenOp::MustNot => {}
                        TokenOp::Should => {
                            should_seen = true;
                            should_hit |= hit;
                        }
                    }
                }
                must_seen || !should_seen || should_hit
            }
        }
    }
}
