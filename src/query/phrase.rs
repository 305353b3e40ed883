//! Term queries: `+must -must_not should "quoted phrase"`.
//!
//! The parser produces a flat list of clauses; `compile` turns them into
//! regexes bucketed by operator. A compiled query matches when every `must`
//! clause matches, no `must_not` clause matches, and, if there are no `must`
//! clauses, at least one `should` clause matches.

use crate::errors::{AppError, AppResult, QueryError};
use crate::query::Case;
use crate::tags::wildcard_to_regex;
use regex::{Regex, RegexBuilder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Must,
    MustNot,
    Should,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// A single word; `*` and `?` act as wildcards.
    Word(String),
    /// A quoted phrase, matched literally.
    Phrase(String),
}

impl Term {
    pub fn text(&self) -> &str {
        match self {
            Term::Word(text) | Term::Phrase(text) => text,
        }
    }

    fn to_regex(&self) -> String {
        match self {
            Term::Word(word) => wildcard_to_regex(word),
            Term::Phrase(phrase) => regex::escape(phrase),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub operator: Operator,
    pub term: Term,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseQuery {
    pub clauses: Vec<Clause>,
}

impl PhraseQuery {
    /// Parses a term query.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::EmptyQuery` if the input holds no terms.
    ///
    /// # Examples
    ///
    /// ```
    /// use logbook::query::{Operator, PhraseQuery, Term};
    ///
    /// let query = PhraseQuery::parse(r#"+release -"rolled back" notes"#).unwrap();
    /// assert_eq!(query.must(), vec![&Term::Word("release".to_string())]);
    /// assert_eq!(query.must_not(), vec![&Term::Phrase("rolled back".to_string())]);
    /// assert_eq!(query.should(), vec![&Term::Word("notes".to_string())]);
    /// ```
    pub fn parse(input: &str) -> AppResult<Self> {
        let mut clauses = Vec::new();
        let mut chars = input.chars().peekable();

        while let Some(&c) = chars.peek() {
            if c.is_whitespace() {
                chars.next();
                continue;
            }

            let operator = match c {
                '+' => {
                    chars.next();
                    Operator::Must
                }
                '-' => {
                    chars.next();
                    Operator::MustNot
                }
                _ => Operator::Should,
            };

            let term = if chars.peek() == Some(&'"') {
                chars.next();
                let phrase: String = chars.by_ref().take_while(|&c| c != '"').collect();
                Term::Phrase(phrase.trim().to_string())
            } else {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                Term::Word(word)
            };

            if !term.text().is_empty() {
                clauses.push(Clause { operator, term });
            }
        }

        if clauses.is_empty() {
            return Err(QueryError::EmptyQuery.into());
        }
        Ok(PhraseQuery { clauses })
    }

    fn bucket(&self, operator: Operator) -> Vec<&Term> {
        self.clauses
            .iter()
            .filter(|clause| clause.operator == operator)
            .map(|clause| &clause.term)
            .collect()
    }

    pub fn must(&self) -> Vec<&Term> {
        self.bucket(Operator::Must)
    }

    pub fn must_not(&self) -> Vec<&Term> {
        self.bucket(Operator::MustNot)
    }

    pub fn should(&self) -> Vec<&Term> {
        self.bucket(Operator::Should)
    }

    /// Builds the matcher. Case is resolved once against the whole query
    /// text, so `Case::Smart` turns sensitive if any term has an uppercase
    /// letter.
    pub fn compile(&self, case: Case) -> AppResult<CompiledPhrase> {
        let all_text: String = self
            .clauses
            .iter()
            .map(|c| c.term.text())
            .collect::<Vec<_>>()
            .join(" ");
        let sensitive = case.is_sensitive(&all_text);

        let build = |terms: Vec<&Term>| -> AppResult<Vec<Regex>> {
            terms
                .into_iter()
                .map(|term| {
                    let pattern = term.to_regex();
                    RegexBuilder::new(&pattern)
                        .case_insensitive(!sensitive)
                        .build()
                        .map_err(|e| {
                            AppError::from(QueryError::InvalidPattern {
                                pattern,
                                message: e.to_string(),
                            })
                        })
                })
                .collect()
        };

        Ok(CompiledPhrase {
            must: build(self.must())?,
            must_not: build(self.must_not())?,
            should: build(self.should())?,
        })
    }
}

/// A `PhraseQuery` ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledPhrase {
    must: Vec<Regex>,
    must_not: Vec<Regex>,
    should: Vec<Regex>,
}

impl CompiledPhrase {
    pub fn is_match(&self, text: &str) -> bool {
        if self.must_not.iter().any(|re| re.is_match(text)) {
            return false;
        }
        if !self.must.iter().all(|re| re.is_match(text)) {
            return false;
        }
        if !self.must.is_empty() || self.should.is_empty() {
            return true;
        }
        self.should.iter().any(|re| re.is_match(text))
    }

    /// Regexes whose matches should be highlighted: the positive terms.
    pub fn positive(&self) -> impl Iterator<Item = &Regex> {
        self.must.iter().chain(self.should.iter())
    }
}
