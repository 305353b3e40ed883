//! Multi-line notes attached to an item.

use std::fmt;

/// Ordered note lines. Lines are stored trimmed; blank lines and `#` comment
/// lines never make it in.
#[derive(Debug, Clone, Default)]
pub struct Note {
    lines: Vec<String>,
}

impl Note {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a note from free text, one line per newline.
    pub fn from_text(text: &str) -> Self {
        let mut note = Note::new();
        note.add(text, false);
        note
    }

    /// Adds the lines of `text`. With `replace` the existing lines are
    /// dropped first.
    pub fn add(&mut self, text: &str, replace: bool) {
        let lines: Vec<&str> = text.lines().collect();
        self.add_lines(&lines, replace);
    }

    /// Adds already split lines. With `replace` the existing lines are
    /// dropped first.
    pub fn add_lines<S: AsRef<str>>(&mut self, lines: &[S], replace: bool) {
        if replace {
            self.lines.clear();
        }
        self.lines.extend(
            lines
                .iter()
                .flat_map(|line| line.as_ref().lines())
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(str::to_string),
        );
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// All lines joined by a single space, for searching.
    pub fn to_line(&self) -> String {
        self.lines.join(" ")
    }

    fn normalized(&self) -> String {
        self.lines.join("\n")
    }

    /// Compares normalized text rather than line vectors.
    pub fn equals(&self, other: &Note) -> bool {
        self.normalized() == other.normalized()
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for Note {}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "\t\t{}", line)?;
        }
        Ok(())
    }
}
