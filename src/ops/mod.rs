//! User-facing operations on the journal.
//!
//! Each operation loads the journal, does its work through the content,
//! query and backup modules, and writes the result back through
//! `journal_io`, which snapshots the previous version first.

pub mod add;
pub mod history;
pub mod show;
pub mod tag;

pub use add::{add_entry, finish_last, AddOptions};
pub use history::{list_history, redo, undo, Step};
pub use show::{render_json, render_text, show_items, ItemRecord, OutputFormat};
pub use tag::tag_items;
