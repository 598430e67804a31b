use crate::Position;

/// A checkpoint for saving and restoring parsing/lexing state.
///
/// The lexer uses it for byte offsets within the source; the parser uses it
/// for token indexes plus the length of its destination-graph journal, so
/// that a single restore rewinds both the cursor and every mutation made
/// since the checkpoint was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint {
    /// The index (byte offset for lexer, token index for parser) at this checkpoint.
    index: usize,
    /// The position in the source at this checkpoint.
    position: Position,
    /// Number of journal entries recorded when the checkpoint was taken.
    journal: usize,
}

impl Checkpoint {
    /// Creates a new checkpoint with the given index and position.
    pub fn new(index: usize, position: Position) -> Self {
        Self {
            index,
            position,
            journal: 0,
        }
    }

    /// Creates a checkpoint that also remembers a journal length.
    pub fn with_journal(index: usize, position: Position, journal: usize) -> Self {
        Self {
            index,
            position,
            journal,
        }
    }

    /// Returns the index stored in this checkpoint.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the position stored in this checkpoint.
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// Returns the journal length stored in this checkpoint.
    pub fn journal(&self) -> usize {
        self.journal
    }

    /// Convenience method for lexer use: returns the byte offset.
    pub fn current(&self) -> usize {
        self.index
    }

    /// Convenience method for parser use: returns the token index.
    pub fn token_index(&self) -> usize {
        self.index
    }
}
