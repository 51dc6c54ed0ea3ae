//! Compiles grammars written in a small PEG notation into parsers.
//!
//! ```text
//! list <- 'c' a+ 'd'
//! a    <- 'a' / list
//! ```
//!
//! Each line defines a rule, the first rule is where parsing starts. A body
//! is a sequence of literals (`'a'`), regexes (`~'\d+'`) and rule names, each
//! optionally followed by `*`, `+` or `?`. `/` is an ordered choice between
//! the atoms directly on either side of it.
//!
//! Inside a literal `\'` is a quote, and `\n`, `\t` and `\r` are the control
//! characters they name. Any other backslash is kept as it is. A regex only
//! has `\'` replaced, the rest goes to the regex engine untouched.
//!
//! ```
//! let g = peg::Grammar::compile("nl <- '\\n'").unwrap();
//! assert!(g.parse("\n").is_ok());
//! assert!(g.parse("\\n").is_err());
//! ```

use std::fmt::{self, Display};
use std::io::Read;
use std::str::FromStr;

use log::debug;
use parsegen::{Graph, NodeId, NodeKind};

mod error;
pub mod lexer;
mod parser;
mod resolve;

pub use error::Error;
pub use parsegen::{Expected, ParseError, ParseTree, Source};
pub use parser::Rule;

/// A compiled grammar.
///
/// Compiling produces a graph that's never modified again, so a grammar can
/// be shared between threads and used for any number of parses.
#[derive(Debug, Clone)]
pub struct Grammar {
    graph: Graph,
    root: NodeId,
    rules: Vec<Rule>,
}

/// The result of a successful parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parse {
    pub tree: ParseTree,
    /// Bytes consumed from the start of the input. May be less than the
    /// length of the input.
    pub consumed: usize,
}

impl Grammar {
    pub fn compile(source: &str) -> Result<Self, Error> {
        let (mut graph, rules) = parser::parse(source)?;
        let root = resolve::resolve(&mut graph, &rules)?;
        debug!(
            "compiled grammar with {} rules, {} nodes",
            rules.len(),
            graph.len()
        );
        Ok(Grammar { graph, root, rules })
    }

    pub fn from_reader<R: Read>(mut input: R) -> Result<Self, Error> {
        let mut source = String::new();
        input.read_to_string(&mut source)?;
        Self::compile(&source)
    }

    /// Name of the rule parsing starts at.
    pub fn start_rule(&self) -> &str {
        &self.rules[0].name
    }

    /// Rules in definition order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Parse from the start of `input`. Input left over after the start rule
    /// matched is not an error, see `consumed`.
    pub fn parse(&self, input: impl AsRef<[u8]>) -> Result<Parse, ParseError> {
        self.parse_source(&Source::new(input.as_ref()))
    }

    pub fn parse_reader<R: Read>(&self, input: R) -> Result<Parse, ParseError> {
        let source = Source::from_reader(input)?;
        self.parse_source(&source)
    }

    pub fn parse_source(&self, source: &Source) -> Result<Parse, ParseError> {
        let m = parsegen::run(&self.graph, self.root, source, 0)?;
        // The start rule matched without producing anything, e.g. a star
        // matching nothing.
        let tree = m
            .tree
            .unwrap_or_else(|| ParseTree::node(self.start_rule(), Vec::new()));
        Ok(Parse {
            tree,
            consumed: m.len,
        })
    }

    /// Like `parse`, but all of the input must be consumed.
    pub fn parse_complete(&self, input: impl AsRef<[u8]>) -> Result<ParseTree, ParseError> {
        let input = input.as_ref();
        let parse = self.parse(input)?;
        if parse.consumed == input.len() {
            Ok(parse.tree)
        } else {
            Err(ParseError::Incomplete {
                consumed: parse.consumed,
                len: input.len(),
            })
        }
    }

    fn fmt_node(&self, f: &mut fmt::Formatter, id: NodeId) -> fmt::Result {
        match &self.graph[id].kind {
            NodeKind::Literal(lit) => {
                write!(f, "'")?;
                for c in String::from_utf8_lossy(lit).chars() {
                    match c {
                        '\'' => write!(f, "\\'")?,
                        '\n' => write!(f, "\\n")?,
                        '\t' => write!(f, "\\t")?,
                        '\r' => write!(f, "\\r")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                write!(f, "'")
            }
            NodeKind::Regex(pattern) => write!(f, "~'{}'", pattern.as_str().replace('\'', "\\'")),
            NodeKind::Reference { target, .. } => write!(f, "{}", target),
            NodeKind::Sequence(children) => {
                for (i, &child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    self.fmt_node(f, child)?;
                }
                Ok(())
            }
            NodeKind::Alternate(left, right) => {
                self.fmt_node(f, *left)?;
                write!(f, " / ")?;
                self.fmt_node(f, *right)
            }
            NodeKind::Star { child, .. } => {
                self.fmt_node(f, *child)?;
                write!(f, "*")
            }
            NodeKind::Plus { child, .. } => {
                self.fmt_node(f, *child)?;
                write!(f, "+")
            }
            NodeKind::Optional(child) => {
                self.fmt_node(f, *child)?;
                write!(f, "?")
            }
        }
    }
}

/// Prints the grammar back in the notation it was compiled from.
impl Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rule in &self.rules {
            write!(f, "{} <- ", rule.name)?;
            self.fmt_node(f, rule.node)?;
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Grammar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grammar::compile(s)
    }
}

/// A type with a grammar attached, usually implemented with
/// `#[derive(Parser)]`.
pub trait Parser {
    fn grammar() -> &'static Grammar;

    fn parse(input: &str) -> Result<ParseTree, ParseError> {
        Self::grammar().parse(input).map(|p| p.tree)
    }

    fn parse_complete(input: &str) -> Result<ParseTree, ParseError> {
        Self::grammar().parse_complete(input)
    }
}
