//! Newtypes for byte offsets and ranges into source text.
//!
//! This crate follows the design of
//! [ruff_text_size](https://github.com/astral-sh/ruff) by Astral Software
//! Inc., licensed under MIT.

mod range;
mod size;
mod traits;

pub use crate::range::TextRange;
pub use crate::size::TextSize;
pub use crate::traits::{Ranged, TextLen};

#[cfg(target_pointer_width = "16")]
compile_error!("text-size assumes usize >= u32 and does not work on 16-bit targets");
