//! Whitespace-related rules.

pub mod file_tab_character;
mod trailing_whitespace;

pub use file_tab_character::FileTabCharacter;
pub use trailing_whitespace::TrailingWhitespace;
