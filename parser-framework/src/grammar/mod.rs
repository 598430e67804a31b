//! The grammar mini-language: scanning, compiling and the node model.

mod compiler;
mod node;
mod scanner;

pub(crate) use compiler::compile;
pub use node::{Disjunction, Node};
