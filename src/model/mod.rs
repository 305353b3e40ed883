//! Data model: items, their notes, and the sections that group them.
//!
//! These types are pure values. Parsing a whole file into them lives in
//! `content`; reading and writing the file lives in `journal_io`.

mod item;
mod note;
mod section;

pub use item::Item;
pub use note::Note;
pub use section::Section;
