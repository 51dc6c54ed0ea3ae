use std::fmt::{self, Display};

pub type Result<T> = std::result::Result<T, DeriveError>;

#[derive(Debug, Clone, PartialEq)]
pub enum DeriveError {
    MissingGrammarSource,
    MultipleGrammarSources,
    /// The grammar attribute isn't of the form `name = "string"`.
    InvalidAttribute(String),
    ReadFile { path: String, message: String },
    InvalidGrammar(peg::Error),
}

impl Display for DeriveError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeriveError::MissingGrammarSource => write!(
                f,
                "No grammar source provided, expected #[peg_inline = \"...\"] or #[peg_file = \"...\"]"
            ),
            DeriveError::MultipleGrammarSources => {
                write!(f, "At most one grammar source can be provided")
            }
            DeriveError::InvalidAttribute(s) => write!(f, "Invalid grammar attribute: {}", s),
            DeriveError::ReadFile { path, message } => {
                write!(f, "Failed to read grammar file {}: {}", path, message)
            }
            DeriveError::InvalidGrammar(e) => write!(f, "Invalid grammar: {}", e),
        }
    }
}

impl From<syn::Error> for DeriveError {
    fn from(e: syn::Error) -> DeriveError {
        DeriveError::InvalidAttribute(e.to_string())
    }
}

impl From<peg::Error> for DeriveError {
    fn from(e: peg::Error) -> DeriveError {
        DeriveError::InvalidGrammar(e)
    }
}
