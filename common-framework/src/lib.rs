//! Common Framework
//!
//! Components shared by `lexer-framework` and `parser-framework`: source
//! positions, checkpoints and shared text slices.

pub mod checkpoint;
pub mod position;
pub mod text_slice;

pub use checkpoint::Checkpoint;
pub use position::{Position, UNKNOWN_SOURCE};
pub use text_slice::TextSlice;
