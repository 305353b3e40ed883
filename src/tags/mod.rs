//! The inline tag mini-language.
//!
//! Item titles carry `@name` and `@name(value)` markers. This module scans
//! them into spans, matches names with `*`/`?` wildcards, and rewrites titles
//! for the add/remove/rename operations. All functions work on plain string
//! slices and return new `String`s; nothing here knows about `Item`.
//!
//! Case sensitivity follows one rule everywhere: a pattern containing an
//! uppercase character matches case-sensitively, anything else ignores case.

use crate::errors::{AppResult, QueryError};
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:^|[\s(\[])@(?P<name>[\w-]+(?:\.[\w-]+)*)(?:\((?P<value>[^)]*)\))?")
        .expect("valid tag regex")
});

/// One `@name(value)?` occurrence inside a title, with byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagSpan {
    /// Offset of the `@`.
    pub start: usize,
    /// Offset just past the tag (past the closing paren when a value is present).
    pub end: usize,
    pub name: String,
    pub value: Option<String>,
}

/// Finds every tag in `title`, in order of appearance.
pub fn scan_tags(title: &str) -> Vec<TagSpan> {
    TAG_RE
        .captures_iter(title)
        .filter_map(|caps| {
            let name = caps.name("name")?;
            let whole = caps.get(0)?;
            Some(TagSpan {
                start: name.start() - 1,
                end: whole.end(),
                name: name.as_str().to_string(),
                value: caps.name("value").map(|v| v.as_str().to_string()),
            })
        })
        .collect()
}

/// Tag names in order of appearance.
pub fn tag_names(title: &str) -> Vec<String> {
    scan_tags(title).into_iter().map(|span| span.name).collect()
}

/// Renders `@name` or `@name(value)`.
pub fn format_tag(name: &str, value: Option<&str>) -> String {
    let name = name.trim_start_matches('@');
    match value {
        Some(value) => format!("@{}({})", name, value),
        None => format!("@{}", name),
    }
}

/// Splits a tag list on commas and whitespace, except inside parentheses,
/// so `done(2024-01-01 10:00), flow` yields two tokens.
pub fn split_tag_list(list: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in list.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                tokens.push(&list[start..i]);
                start = i + 1;
            }
            c if c.is_whitespace() && depth == 0 => {
                tokens.push(&list[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    tokens.push(&list[start..]);
    tokens
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Whether the pattern selects case-sensitive matching.
pub fn is_case_sensitive(pattern: &str) -> bool {
    pattern.chars().any(char::is_uppercase)
}

/// Translates `*` and `?` wildcards into a regex fragment, escaping
/// everything else.
pub fn wildcard_to_regex(pattern: &str) -> String {
    regex::escape(pattern)
        .replace(r"\*", ".*?")
        .replace(r"\?", r"\S")
}

fn compile(fragment: &str, case_sensitive: bool) -> AppResult<Regex> {
    let anchored = format!("^(?:{})$", fragment);
    RegexBuilder::new(&anchored)
        .case_insensitive(!case_sensitive)
        .build()
        .map_err(|e| {
            QueryError::InvalidPattern {
                pattern: fragment.to_string(),
                message: e.to_string(),
            }
            .into()
        })
}

/// Matches whole tag names against a wildcard or regex pattern.
#[derive(Debug, Clone)]
pub struct NameMatcher {
    re: Regex,
}

impl NameMatcher {
    /// Builds a matcher for `pattern`. With `regex` the pattern is used as a
    /// raw regex fragment; otherwise only `*` and `?` are special.
    pub fn new(pattern: &str, regex: bool) -> AppResult<Self> {
        let pattern = pattern.trim().trim_start_matches('@');
        let fragment = if regex {
            pattern.to_string()
        } else {
            wildcard_to_regex(pattern)
        };
        Ok(NameMatcher {
            re: compile(&fragment, is_case_sensitive(pattern))?,
        })
    }

    pub fn is_match(&self, name: &str) -> bool {
        self.re.is_match(name)
    }
}

/// Matches a tag value against a wildcard pattern.
#[derive(Debug, Clone)]
pub struct ValueMatcher {
    re: Regex,
}

impl ValueMatcher {
    pub fn new(pattern: &str) -> AppResult<Self> {
        let pattern = pattern.trim();
        Ok(ValueMatcher {
            re: compile(&wildcard_to_regex(pattern), is_case_sensitive(pattern))?,
        })
    }

    pub fn is_match(&self, value: &str) -> bool {
        self.re.is_match(value.trim())
    }
}

/// Polarity of a tag token in a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOp {
    /// `+tag`
    Must,
    /// `-tag`
    MustNot,
    /// bare `tag`
    Should,
}

/// A parsed filter token such as `+project(logbook*)` or `-done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagToken {
    pub name: String,
    pub value: Option<String>,
    pub op: TokenOp,
}

impl TagToken {
    /// Parses one token. Leading `+`/`-` set the polarity and a leading `@`
    /// is ignored. Returns `None` for tokens with no name.
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        let (op, rest) = match token.chars().next()? {
            '+' => (TokenOp::Must, &token[1..]),
            '-' => (TokenOp::MustNot, &token[1..]),
            _ => (TokenOp::Should, token),
        };
        let rest = rest.trim_start_matches('@');
        let (name, value) = match rest.find('(') {
            Some(open) if rest.ends_with(')') => {
                (&rest[..open], Some(rest[open + 1..rest.len() - 1].to_string()))
            }
            _ => (rest, None),
        };
        if name.is_empty() {
            return None;
        }
        Some(TagToken {
            name: name.to_string(),
            value,
            op,
        })
    }

    /// Compiles the token for repeated matching.
    pub fn compile(&self) -> AppResult<CompiledToken> {
        Ok(CompiledToken {
            name: NameMatcher::new(&self.name, false)?,
            value: self.value.as_deref().map(ValueMatcher::new).transpose()?,
            op: self.op,
        })
    }
}

/// A `TagToken` with its matchers built.
#[derive(Debug, Clone)]
pub struct CompiledToken {
    name: NameMatcher,
    value: Option<ValueMatcher>,
    pub op: TokenOp,
}

impl CompiledToken {
    /// Whether any tag in `title` satisfies this token.
    pub fn matches(&self, title: &str) -> bool {
        scan_tags(title).iter().any(|span| {
            self.name.is_match(&span.name)
                && match (&self.value, &span.value) {
                    (None, _) => true,
                    (Some(want), Some(have)) => want.is_match(have),
                    (Some(_), None) => false,
                }
        })
    }
}

/// A requested change to the tags of a title.
///
/// Exactly one of three things happens: with `rename_to` set the first
/// matching tag is renamed, with `remove` set it is deleted, otherwise the tag
/// is added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagOp {
    pub name: String,
    pub value: Option<String>,
    pub remove: bool,
    pub rename_to: Option<String>,
    pub regex: bool,
    pub force: bool,
}

impl TagOp {
    pub fn add(name: &str) -> Self {
        TagOp {
            name: name.trim_start_matches('@').to_string(),
            ..Default::default()
        }
    }

    pub fn remove(name: &str) -> Self {
        TagOp {
            remove: true,
            ..TagOp::add(name)
        }
    }

    pub fn rename(from: &str, to: &str) -> Self {
        TagOp {
            remove: true,
            rename_to: Some(to.trim_start_matches('@').to_string()),
            ..TagOp::add(from)
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn regex(mut self) -> Self {
        self.regex = true;
        self
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}

/// Removes `start..end` and one adjoining space so words stay separated by
/// a single blank.
fn cut(title: &str, start: usize, end: usize) -> String {
    let before = &title[..start];
    let after = &title[end..];
    if before.ends_with(' ') {
        format!("{}{}", &before[..before.len() - 1], after)
    } else if after.starts_with(' ') {
        format!("{}{}", before, &after[1..])
    } else {
        format!("{}{}", before, after)
    }
}

fn append(title: &str, tag: &str) -> String {
    let trimmed = title.trim_end();
    if trimmed.is_empty() {
        tag.to_string()
    } else {
        format!("{} {}", trimmed, tag)
    }
}

/// Applies `op` to `title` and returns the new title, deduplicated.
///
/// # Errors
///
/// Returns `QueryError::InvalidPattern` when `op.regex` is set and the name is
/// not a valid regex fragment.
pub fn apply(title: &str, op: &TagOp) -> AppResult<String> {
    let matcher = NameMatcher::new(&op.name, op.regex)?;
    let spans = scan_tags(title);
    let found = spans.iter().find(|span| matcher.is_match(&span.name));

    let updated = match (&op.rename_to, op.remove, found) {
        (Some(to), _, Some(span)) => {
            let value = op.value.as_deref().or(span.value.as_deref());
            format!(
                "{}{}{}",
                &title[..span.start],
                format_tag(to, value),
                &title[span.end..]
            )
        }
        (Some(to), _, None) if op.force => append(title, &format_tag(to, op.value.as_deref())),
        (_, true, Some(span)) => cut(title, span.start, span.end),
        (_, true, None) | (Some(_), false, None) => title.to_string(),
        (None, false, Some(span)) => match &op.value {
            Some(value) if span.value.as_deref() != Some(value.as_str()) => format!(
                "{}{}{}",
                &title[..span.start],
                format_tag(&span.name, Some(value)),
                &title[span.end..]
            ),
            _ => title.to_string(),
        },
        (None, false, None) => append(title, &format_tag(&op.name, op.value.as_deref())),
    };

    Ok(dedup(&updated))
}

/// Keeps the first occurrence of every tag name (compared without case) and
/// deletes the rest, values included.
pub fn dedup(title: &str) -> String {
    let mut seen: Vec<String> = Vec::new();
    let mut doomed = Vec::new();
    for span in scan_tags(title) {
        let key = span.name.to_lowercase();
        if seen.contains(&key) {
            doomed.push(span);
        } else {
            seen.push(key);
        }
    }

    let mut result = title.to_string();
    for span in doomed.iter().rev() {
        result = cut(&result, span.start, span.end);
    }
    result
}

/// Value of the first tag matching `name`, if the tag carries one.
pub fn tag_value(title: &str, name: &str) -> Option<String> {
    let matcher = NameMatcher::new(name, false).ok()?;
    scan_tags(title)
        .into_iter()
        .find(|span| matcher.is_match(&span.name))
        .and_then(|span| span.value)
}

/// Whether `title` carries a tag matching the wildcard `name`.
pub fn has_tag(title: &str, name: &str) -> bool {
    match NameMatcher::new(name, false) {
        Ok(matcher) => scan_tags(title).iter().any(|span| matcher.is_match(&span.name)),
        Err(_) => false,
    }
}
