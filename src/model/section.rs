//! Named buckets of items.

use once_cell::sync::Lazy;
use regex::Regex;

static HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S[\S ]+):\s*(@\S+(\(.*?\))?\s*)*$").expect("valid heading regex")
});

/// A section heading. `original` is the heading line exactly as read, so
/// decorations such as trailing tags survive a rewrite of the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub original: String,
}

impl Section {
    /// A fresh section whose heading is just `Title:`.
    pub fn new(title: &str) -> Self {
        let title = title.trim().trim_end_matches(':').trim();
        Section {
            title: title.to_string(),
            original: format!("{}:", title),
        }
    }

    /// Recognizes a heading line, returning `None` for anything else.
    pub fn from_heading(line: &str) -> Option<Self> {
        let caps = HEADING_RE.captures(line)?;
        Some(Section {
            title: caps.get(1)?.as_str().trim().to_string(),
            original: line.to_string(),
        })
    }

    /// Case-insensitive title comparison.
    pub fn is(&self, title: &str) -> bool {
        self.title.to_lowercase() == title.trim().to_lowercase()
    }
}
