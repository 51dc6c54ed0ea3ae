use std::io::{self, Read};

use regex::bytes::Regex;

/// A compiled regular expression that only matches at the start of the text
/// it's given.
#[derive(Debug, Clone)]
pub struct Pattern {
    source: String,
    regex: Regex,
}

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{})", source))?;
        Ok(Pattern {
            source: source.to_owned(),
            regex,
        })
    }

    /// The pattern as it was written in the grammar.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// The full input for a parse.
///
/// A source never tracks a cursor. Every match is given the position it
/// should start at, so the same source can be probed from as many positions
/// as backtracking requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    buf: Vec<u8>,
}

impl Source {
    pub fn new(buf: impl Into<Vec<u8>>) -> Self {
        Source { buf: buf.into() }
    }

    /// Read everything from `input` into a new source.
    pub fn from_reader<R: Read>(mut input: R) -> io::Result<Self> {
        let mut buf = Vec::new();
        input.read_to_end(&mut buf)?;
        Ok(Source { buf })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Check if `lit` appears in the input starting at `pos`. Returns the
    /// matched bytes.
    pub fn match_literal(&self, pos: usize, lit: &[u8]) -> Option<&[u8]> {
        let rest = self.buf.get(pos..)?;
        if rest.starts_with(lit) {
            Some(&rest[..lit.len()])
        } else {
            None
        }
    }

    /// Check if `pattern` matches the input starting exactly at `pos`. A match
    /// further along the input does not count.
    pub fn match_pattern(&self, pos: usize, pattern: &Pattern) -> Option<&[u8]> {
        let rest = self.buf.get(pos..)?;
        pattern.regex.find(rest).map(|m| &rest[..m.end()])
    }
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Source::new(s)
    }
}

impl From<&[u8]> for Source {
    fn from(b: &[u8]) -> Self {
        Source::new(b)
    }
}
