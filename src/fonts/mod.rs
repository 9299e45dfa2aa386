//! Font file inspection.

pub mod name_table;

pub use name_table::read_font_names;
