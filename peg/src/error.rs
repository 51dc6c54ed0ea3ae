use std::error;
use std::fmt::{self, Display};

use crate::lexer::Token;

/// Errors compiling a grammar. Any of these means no grammar was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The lexer produced an error token. `text` is the source from
    /// `offset` to the end of the line, shortened.
    Lex {
        message: String,
        offset: usize,
        text: String,
    },
    UnexpectedToken { expected: &'static str, token: Token },
    /// The token sequence ended in the middle of a rule.
    UnexpectedEnd { expected: &'static str },
    Regex {
        pattern: String,
        offset: usize,
        message: String,
    },
    DuplicateRule { name: String, offset: usize },
    UnresolvedRule { name: String, referenced_by: String },
    EmptyGrammar,
    Io(String),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Lex {
                message,
                offset,
                text,
            } => write!(
                f,
                "failed to lex grammar at byte {} ({:?}): {}",
                offset, text, message
            ),
            Error::UnexpectedToken { expected, token } => write!(
                f,
                "failed to parse grammar at byte {}: expected {}, found {}",
                token.offset, expected, token
            ),
            Error::UnexpectedEnd { expected } => {
                write!(f, "failed to parse grammar: expected {}, found end", expected)
            }
            Error::Regex {
                pattern,
                offset,
                message,
            } => write!(
                f,
                "invalid regex ~'{}' at byte {}: {}",
                pattern, offset, message
            ),
            Error::DuplicateRule { name, offset } => {
                write!(f, "rule '{}' redefined at byte {}", name, offset)
            }
            Error::UnresolvedRule {
                name,
                referenced_by,
            } => write!(
                f,
                "rule '{}' referenced by '{}' is not defined",
                name, referenced_by
            ),
            Error::EmptyGrammar => write!(f, "grammar defines no rules"),
            Error::Io(s) => write!(f, "failed to read grammar: {}", s),
        }
    }
}

impl error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Error {
        Error::Io(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lex_error_shows_source() {
        let err = Error::Lex {
            message: "expected <-".to_owned(),
            offset: 2,
            text: "< b".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "failed to lex grammar at byte 2 (\"< b\"): expected <-"
        );
    }
}
