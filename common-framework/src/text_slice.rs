use std::ops::{Deref, Range};
use std::sync::Arc;

/// Immutable slice of a shared source buffer.
///
/// Holding the `Arc<str>` lets lexing rules keep the text they consumed while
/// the cursor keeps advancing over the same buffer.
#[derive(Clone, Debug)]
pub struct TextSlice {
    buffer: Arc<str>,
    range: Range<usize>,
}

impl TextSlice {
    /// Creates a new slice from the given shared buffer and byte range.
    pub fn new(buffer: Arc<str>, start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        debug_assert!(end <= buffer.len());
        Self {
            buffer,
            range: start..end,
        }
    }

    /// Returns the byte range covered by this slice.
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Returns the start offset.
    pub fn start(&self) -> usize {
        self.range.start
    }

    /// Returns the end offset.
    pub fn end(&self) -> usize {
        self.range.end
    }
}

impl std::fmt::Display for TextSlice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self)
    }
}

impl Deref for TextSlice {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.buffer[self.range.clone()]
    }
}

impl AsRef<str> for TextSlice {
    fn as_ref(&self) -> &str {
        self
    }
}

impl PartialEq<&str> for TextSlice {
    fn eq(&self, other: &&str) -> bool {
        self.deref() == *other
    }
}

impl PartialEq for TextSlice {
    fn eq(&self, other: &Self) -> bool {
        self.deref() == other.deref()
    }
}

impl Eq for TextSlice {}
