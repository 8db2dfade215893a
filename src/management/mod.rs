//! Local activity store.
//!
//! Reads the CSV files of an extracted Letterboxd export from
//! `<root_folder>/static`. The export is the only source of truth; nothing
//! is ever written back.

mod export;
mod lists;

pub use export::ActivityIndex;
pub use export::ExportKind;
pub use export::ExportManager;
pub use export::read_records;
pub use lists::find_list;
pub use lists::parse_list;
