//! Compile grammars written in a small PEG notation and parse with them.
//!
//! ```
//! let grammar = pegc::Grammar::compile("list <- 'c' a+ 'd'\na <- 'a' / list").unwrap();
//! let tree = grammar.parse_complete("caad").unwrap();
//! assert_eq!(tree.type_name(), "list");
//! ```

pub use derive::Parser;
pub use peg::{lexer, Error, Expected, Grammar, Parse, ParseError, ParseTree, Parser, Rule, Source};
