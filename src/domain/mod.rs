pub mod document;
pub mod formatting;
pub mod project;
pub mod recents;
