//! Coding rules.

mod unnecessary_parentheses;

pub use unnecessary_parentheses::UnnecessaryParentheses;
