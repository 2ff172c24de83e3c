//! Line/column lookup for source text.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use fixall_text_size::{TextLen, TextRange, TextSize};

/// A 1-based index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "get-size", derive(get_size2::GetSize))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OneIndexed(NonZeroUsize);

impl OneIndexed {
    pub const MIN: Self = Self(NonZeroUsize::MIN);

    /// Create a one-indexed value from a zero-indexed one.
    pub const fn from_zero_indexed(value: usize) -> Self {
        match NonZeroUsize::new(value + 1) {
            Some(value) => Self(value),
            None => Self::MIN,
        }
    }

    pub const fn get(self) -> usize {
        self.0.get()
    }

    pub const fn to_zero_indexed(self) -> usize {
        self.0.get() - 1
    }
}

impl fmt::Display for OneIndexed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A line/column location in the source text.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: OneIndexed,
    pub column: OneIndexed,
}

/// Index of the line starts of a source text.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "get-size", derive(get_size2::GetSize))]
pub struct LineIndex {
    line_starts: Arc<[TextSize]>,
}

impl LineIndex {
    /// Build the index by scanning `text` for `\n`.
    pub fn from_source_text(text: &str) -> Self {
        let mut line_starts = Vec::with_capacity(text.len() / 88 + 1);
        line_starts.push(TextSize::default());
        for newline in memchr::memchr_iter(b'\n', text.as_bytes()) {
            // Offsets stay within u32 because the whole text does.
            #[allow(clippy::cast_possible_truncation)]
            line_starts.push(TextSize::new(newline as u32 + 1));
        }
        Self {
            line_starts: line_starts.into(),
        }
    }

    /// The zero-based line containing `offset`.
    pub fn line_index(&self, offset: TextSize) -> OneIndexed {
        match self.line_starts.binary_search(&offset) {
            Ok(row) => OneIndexed::from_zero_indexed(row),
            Err(next_row) => OneIndexed::from_zero_indexed(next_row - 1),
        }
    }

    /// The offset at which `line` starts, or the text length past the end.
    pub fn line_start(&self, line: OneIndexed, contents: &str) -> TextSize {
        self.line_starts
            .get(line.to_zero_indexed())
            .copied()
            .unwrap_or_else(|| contents.text_len())
    }

    /// Line and character column (1-based) of `offset` in `content`.
    pub fn source_location(&self, offset: TextSize, content: &str) -> SourceLocation {
        let line = self.line_index(offset);
        let line_start = self.line_start(line, content);
        let column = content[TextRange::new(line_start, offset)].chars().count();
        SourceLocation {
            line,
            column: OneIndexed::from_zero_indexed(column),
        }
    }
}

/// Source text paired with its line index.
#[derive(Debug, Clone, Copy)]
pub struct SourceCode<'src, 'index> {
    text: &'src str,
    index: &'index LineIndex,
}

impl<'src, 'index> SourceCode<'src, 'index> {
    pub fn new(content: &'src str, index: &'index LineIndex) -> Self {
        Self {
            text: content,
            index,
        }
    }

    /// Computes the one indexed row and column numbers for `offset`.
    pub fn line_column(&self, offset: TextSize) -> SourceLocation {
        self.index.source_location(offset, self.text)
    }

    pub fn text(&self) -> &'src str {
        self.text
    }
}
