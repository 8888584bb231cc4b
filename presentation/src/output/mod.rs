//! Output formatting of a processed turn

pub mod console;
pub mod formatter;
