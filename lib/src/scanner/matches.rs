use std::ops::Range;

use serde::Serialize;

/// Represents a match of a signature in some line of text.
#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct Match {
    /// Name of the matching signature.
    pub signature: String,
    /// Pattern of the matching signature.
    pub pattern: String,
    /// Line where the match was found. The first line is 1.
    pub line_no: usize,
    /// Range within the line where the match was found. Offsets are in
    /// characters (not bytes), the end of the range is exclusive.
    pub range: Range<usize>,
    /// The matching text.
    pub data: String,
}

impl Match {
    /// Offset within the line where the match starts.
    #[inline]
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Offset within the line where the match ends (exclusive).
    #[inline]
    pub fn end(&self) -> usize {
        self.range.end
    }

    /// Length of the match in characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.range.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}
