//! Free-text search over item titles and notes.
//!
//! The search string picks its own mode:
//!
//! - `/regex/` is used as a regular expression
//! - `'exact` matches the text after the quote literally
//! - anything else follows `QueryContext::matching`, fuzzy by default
//!
//! A fuzzy query lets up to `distance` characters sit between consecutive
//! letters of a word, and any amount of text between words.

use crate::errors::{AppError, AppResult, QueryError};
use crate::model::Item;
use crate::query::phrase::{CompiledPhrase, PhraseQuery};
use crate::query::{Case, Matching, QueryContext};
use regex::{Captures, Regex, RegexBuilder};
use tracing::debug;

/// A compiled search.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// Regex, exact and fuzzy searches all compile to one regex.
    Pattern(Regex),
    Phrase(CompiledPhrase),
}

/// Builds the fuzzy regex for `query`.
///
/// # Examples
///
/// ```
/// use logbook::query::search::fuzzy_pattern;
///
/// assert_eq!(fuzzy_pattern("ab cd", 2), "a.{0,2}b.*?c.{0,2}d");
/// ```
pub fn fuzzy_pattern(query: &str, distance: usize) -> String {
    let gap = format!(".{{0,{}}}", distance);
    query
        .split_whitespace()
        .map(|word| {
            word.chars()
                .map(|c| regex::escape(&c.to_string()))
                .collect::<Vec<_>>()
                .join(&gap)
        })
        .collect::<Vec<_>>()
        .join(".*?")
}

fn build(pattern: &str, sensitive: bool) -> AppResult<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(!sensitive)
        .build()
        .map_err(|e| {
            AppError::from(QueryError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })
        })
}

impl Matcher {
    /// Compiles `query` using the defaults in `ctx`.
    ///
    /// # Errors
    ///
    /// - `QueryError::EmptyQuery` for blank input
    /// - `QueryError::InvalidPattern` if a `/regex/` does not compile
    pub fn build(query: &str, ctx: &QueryContext) -> AppResult<Self> {
        let query = query.trim();
        if query.is_empty() {
            return Err(QueryError::EmptyQuery.into());
        }

        if query.len() >= 2 && query.starts_with('/') && query.ends_with('/') {
            let body = &query[1..query.len() - 1];
            if body.is_empty() {
                return Err(QueryError::EmptyQuery.into());
            }
            debug!("Regex search: {}", body);
            return Ok(Matcher::Pattern(build(body, ctx.case.is_sensitive(body))?));
        }

        if let Some(exact) = query.strip_prefix('\'') {
            let exact = exact.trim();
            if exact.is_empty() {
                return Err(QueryError::EmptyQuery.into());
            }
            return Ok(Matcher::Pattern(build(
                &regex::escape(exact),
                ctx.case.is_sensitive(exact),
            )?));
        }

        let sensitive = ctx.case.is_sensitive(query);
        match ctx.matching {
            Matching::Fuzzy => {
                let pattern = fuzzy_pattern(query, ctx.distance);
                debug!("Fuzzy search pattern: {}", pattern);
                Ok(Matcher::Pattern(build(&pattern, sensitive)?))
            }
            Matching::Exact => Ok(Matcher::Pattern(build(&regex::escape(query), sensitive)?)),
            Matching::Pattern => Ok(Matcher::Phrase(PhraseQuery::parse(query)?.compile(ctx.case)?)),
        }
    }

    /// Forces a case rule regardless of the context default.
    pub fn build_with_case(query: &str, ctx: &QueryContext, case: Case) -> AppResult<Self> {
        let ctx = QueryContext { case, ..*ctx };
        Matcher::build(query, &ctx)
    }

    pub fn is_match(&self, text: &str) -> bool {
        match self {
            Matcher::Pattern(re) => re.is_match(text),
            Matcher::Phrase(phrase) => phrase.is_match(text),
        }
    }

    /// Whether the item's title or note matches.
    pub fn matches_item(&self, item: &Item) -> bool {
        self.is_match(&item.search_text())
    }

    /// Wraps every matched span of `text` in `open`/`close` without changing
    /// what counts as a match.
    pub fn highlight(&self, text: &str, open: &str, close: &str) -> String {
        let wrap = |caps: &Captures| format!("{}{}{}", open, &caps[0], close);
        match self {
            Matcher::Pattern(re) => re.replace_all(text, wrap).into_owned(),
            Matcher::Phrase(phrase) => phrase
                .positive()
                .fold(text.to_string(), |acc, re| re.replace_all(&acc, wrap).into_owned()),
        }
    }
}
