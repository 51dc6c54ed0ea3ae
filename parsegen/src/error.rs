use std::error;
use std::fmt::{self, Display};

/// What a terminal expected to find at the position it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Literal(Vec<u8>),
    Pattern(String),
}

impl Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expected::Literal(lit) => write!(f, "literal {:?}", String::from_utf8_lossy(lit)),
            Expected::Pattern(p) => write!(f, "match of ~'{}'", p),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No path through the grammar matched. Reports the furthest position any
    /// terminal was tried at, and what was expected there.
    NoMatch {
        position: usize,
        expected: Vec<Expected>,
    },
    /// The grammar matched, but left input unconsumed.
    Incomplete { consumed: usize, len: usize },
    Io(String),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::NoMatch { position, expected } => {
                write!(f, "no match at byte {}", position)?;
                for (i, exp) in expected.iter().enumerate() {
                    if i == 0 {
                        write!(f, ", expected {}", exp)?;
                    } else {
                        write!(f, " or {}", exp)?;
                    }
                }
                Ok(())
            }
            ParseError::Incomplete { consumed, len } => write!(
                f,
                "input only partially consumed, stopped at byte {} of {}",
                consumed, len
            ),
            ParseError::Io(s) => write!(f, "failed to read input: {}", s),
        }
    }
}

impl error::Error for ParseError {}

impl From<std::io::Error> for ParseError {
    fn from(err: std::io::Error) -> ParseError {
        ParseError::Io(err.to_string())
    }
}

/// Keeps the furthest failure seen during a parse.
#[derive(Debug, Default)]
pub(crate) struct Furthest {
    position: usize,
    expected: Vec<Expected>,
}

impl Furthest {
    pub(crate) fn record(&mut self, position: usize, expected: Expected) {
        if position > self.position {
            self.position = position;
            self.expected.clear();
        }
        if position == self.position && !self.expected.contains(&expected) {
            self.expected.push(expected);
        }
    }

    pub(crate) fn into_error(self) -> ParseError {
        ParseError::NoMatch {
            position: self.position,
            expected: self.expected,
        }
    }
}
