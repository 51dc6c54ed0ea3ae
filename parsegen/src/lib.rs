//! Runtime for compiled grammars: the combinator graph, the input source, and
//! the engine matching one against the other.

mod engine;
mod error;
mod graph;
mod source;
mod tree;

pub use engine::{run, Match, Matcher};
pub use error::{Expected, ParseError};
pub use graph::{Graph, Node, NodeId, NodeKind};
pub use source::{Pattern, Source};
pub use tree::ParseTree;
