//! Boolean tag filters.

use crate::errors::AppResult;
use crate::model::Item;
use crate::query::Bool;
use crate::tags::{split_tag_list, CompiledToken, TagToken, TokenOp};

/// A compiled set of tag tokens and the boolean that combines them.
#[derive(Debug, Clone)]
pub struct TagFilter {
    tokens: Vec<CompiledToken>,
    mode: Bool,
}

impl TagFilter {
    /// Builds a filter from individual tokens such as `+work`, `-done`,
    /// `project(log*)`.
    ///
    /// In every mode but `Bool::Pattern` the `+`/`-` prefixes are ignored.
    pub fn new<S: AsRef<str>>(tokens: &[S], mode: Bool) -> AppResult<Self> {
        let tokens = tokens
            .iter()
            .filter_map(|token| TagToken::parse(token.as_ref()))
            .map(|token| token.compile())
            .collect::<AppResult<Vec<_>>>()?;
        Ok(TagFilter { tokens, mode })
    }

    /// Builds a filter from a comma- or space-separated list. Values in
    /// parentheses may contain either.
    pub fn parse(list: &str, mode: Bool) -> AppResult<Self> {
        TagFilter::new(&split_tag_list(list), mode)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Tests an item's title. An empty filter matches everything.
    pub fn matches(&self, item: &Item) -> bool {
        self.matches_title(item.title())
    }

    pub fn matches_title(&self, title: &str) -> bool {
        if self.tokens.is_empty() {
            return true;
        }
        let mut hits = self.tokens.iter().map(|token| (token.op, token.matches(title)));
        match self.mode {
            Bool::And => hits.all(|(_, hit)| hit),
            Bool::Or => hits.any(|(_, hit)| hit),
            Bool::Not => !hits.any(|(_, hit)| hit),
            Bool::Pattern => {
                let hits: Vec<(TokenOp, bool)> = hits.collect();
                let has_must = hits.iter().any(|(op, _)| *op == TokenOp::Must);
                let mut should_seen = false;
                let mut should_hit = false;
                for (op, hit) in hits {
                    match op {
                        TokenOp::Must if !hit => return false,
                        TokenOp::MustNot if hit => return false,
                        TokenOp::Should => {
                            should_seen = true;
                            should_hit |= hit;
                        }
                        _ => {}
                    }
                }
                has_must || !should_seen || should_hit
            }
        }
    }
}
