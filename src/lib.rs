/*!
# Logbook

Logbook keeps a plain-text journal of what you were doing: timestamped
entries grouped into sections, with `@tags`, notes and an `@done` marker for
finished work. The file format round-trips exactly, so a file that is only
read is never rewritten differently.

## Architecture

- `model`, `content`: items, notes, sections and the whole file
- `tags`: tag scanning and add/remove/rename on titles
- `chronify`: natural-language dates and durations
- `query`: tag booleans, text search, value comparisons and their
  composition with date ranges and count/age/sort
- `backup`: per-write snapshots with undo and redo
- `journal_io`: loading and atomically saving the journal
- `ops`: the user-facing operations the binary dispatches to
- `cli`, `config`, `editor`, `errors`, `constants`: the application shell

## Usage Example

```rust,no_run
use logbook::query::{filter_items, FilterOptions, TagFilter, Bool};
use logbook::{journal_io, Config};

fn main() -> logbook::AppResult<()> {
    let config = Config::load()?;
    let content = journal_io::load_content(&config.journal_file)?;

    let options = FilterOptions {
        tags: Some(TagFilter::parse("+work -done", Bool::Pattern)?),
        ..Default::default()
    };
    for item in filter_items(&content, &options)? {
        println!("{}", item.title());
    }
    Ok(())
}
```
*/

/// Snapshots, undo and redo
pub mod backup;
/// Natural-language dates and durations
pub mod chronify;
/// Command-line interface definitions
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// The parsed journal file
pub mod content;
/// External editor integration
pub mod editor;
/// Error types and utilities for error handling
pub mod errors;
/// Reading and writing the journal file
pub mod journal_io;
/// Items, notes and sections
pub mod model;
/// User-facing operations
pub mod ops;
/// Filtering and searching items
pub mod query;
/// Tag parsing and manipulation
pub mod tags;

// Re-export important types for convenience
pub use backup::BackupManager;
pub use config::Config;
pub use content::Content;
pub use errors::{AppError, AppResult};
pub use model::{Item, Note, Section};
