//! Lint rules organized by category.

pub mod coding;
pub mod style;
pub mod whitespace;

pub use coding::UnnecessaryParentheses;
pub use style::UpperEll;
pub use whitespace::{FileTabCharacter, TrailingWhitespace};
