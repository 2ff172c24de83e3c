//! Style rules.

mod upper_ell;

pub use upper_ell::UpperEll;
