use std::fmt::{self, Display};

use nom::{
    bytes::complete::{tag, take_while1},
    error::ErrorKind,
    sequence::preceded,
    IResult, Offset,
};

const SNIPPET_LEN: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Literal,
    Regex,
    /// `<-`
    Assignment,
    Whitespace,
    Newline,
    Star,
    Plus,
    Optional,
    Alternate,
    EndOfInput,
    Error,
}

/// A token lexed from grammar source.
///
/// `offset` is the byte offset of `value` in the source. For an `Error`
/// token, `value` holds the message and `offset` where lexing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub offset: usize,
}

impl Token {
    fn new(kind: TokenKind, value: &str, offset: usize) -> Self {
        Token {
            kind,
            value: value.to_owned(),
            offset,
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::EndOfInput => write!(f, "end of input"),
            TokenKind::Error => write!(f, "{}", self.value),
            kind => write!(f, "{:?} {:?}", kind, self.value),
        }
    }
}

/// Lazily lexes grammar source, one token per call to `next`.
///
/// The sequence ends after `EndOfInput` or the first `Error` token. A
/// character that can't start any token also ends the sequence, without an
/// error.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            done: false,
        }
    }

    pub fn next_token(&mut self) -> Option<Token> {
        if self.done {
            return None;
        }

        let rest = &self.input[self.pos..];
        let token = match rest.chars().next() {
            None => {
                self.done = true;
                Token::new(TokenKind::EndOfInput, "", self.pos)
            }
            Some(c) if is_identifier_char(c) => self.scan(TokenKind::Identifier, identifier),
            Some(' ') | Some('\t') => self.scan(TokenKind::Whitespace, whitespace),
            Some('\n') => self.single(TokenKind::Newline),
            Some('*') => self.single(TokenKind::Star),
            Some('+') => self.single(TokenKind::Plus),
            Some('?') => self.single(TokenKind::Optional),
            Some('/') => self.single(TokenKind::Alternate),
            Some('<') => match assignment(rest) {
                Ok(_) => self.scan(TokenKind::Assignment, assignment),
                Err(_) => self.error("expected <-"),
            },
            Some('\'') => match literal(rest) {
                Ok(_) => self.scan(TokenKind::Literal, literal),
                Err(_) => self.error("eof while parsing literal"),
            },
            Some('~') => match regex_start(rest) {
                Ok(_) => match regex(rest) {
                    Ok(_) => self.scan(TokenKind::Regex, regex),
                    Err(_) => self.error("eof while parsing regex"),
                },
                Err(_) => self.error("expected \"'\" after ~"),
            },
            Some(_) => {
                self.done = true;
                return None;
            }
        };
        Some(token)
    }

    /// Run `f` at the current position. `f` must already be known to succeed.
    fn scan<F>(&mut self, kind: TokenKind, mut f: F) -> Token
    where
        F: FnMut(&'a str) -> IResult<&'a str, &'a str>,
    {
        let input = self.input;
        let rest = &input[self.pos..];
        match f(rest) {
            Ok((rem, matched)) => {
                self.pos = input.offset(rem);
                Token::new(kind, matched, input.offset(matched))
            }
            Err(_) => self.error("invalid token"),
        }
    }

    /// The source from `offset` to the end of its line, cut to at most
    /// `SNIPPET_LEN` chars.
    pub fn snippet(&self, offset: usize) -> &'a str {
        let rest = self.input.get(offset..).unwrap_or("");
        let line = rest.split('\n').next().unwrap_or("");
        match line.char_indices().nth(SNIPPET_LEN) {
            Some((end, _)) => &line[..end],
            None => line,
        }
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.pos += 1;
        Token::new(kind, &self.input[start..self.pos], start)
    }

    fn error(&mut self, message: &str) -> Token {
        self.done = true;
        Token::new(TokenKind::Error, message, self.pos)
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.next_token()
    }
}

pub fn lex(input: &str) -> Lexer<'_> {
    Lexer::new(input)
}

fn is_identifier_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(is_identifier_char)(input)
}

fn whitespace(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c == ' ' || c == '\t')(input)
}

fn assignment(input: &str) -> IResult<&str, &str> {
    tag("<-")(input)
}

fn literal(input: &str) -> IResult<&str, &str> {
    preceded(tag("'"), quoted)(input)
}

fn regex_start(input: &str) -> IResult<&str, &str> {
    tag("~'")(input)
}

fn regex(input: &str) -> IResult<&str, &str> {
    preceded(regex_start, quoted)(input)
}

/// Everything up to the next unescaped `'`, which is consumed but not
/// returned. Only a quote can be escaped, the backslash is kept.
fn quoted(input: &str) -> IResult<&str, &str> {
    let mut chars = input.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' if input[i + 1..].starts_with('\'') => {
                chars.next();
            }
            '\'' => return Ok((&input[i + 1..], &input[..i])),
            _ => (),
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Eof)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use TokenKind::*;

    struct TestCase {
        input: &'static str,
        out: Vec<(TokenKind, &'static str)>,
    }

    fn assert_test_cases(tests: Vec<TestCase>) {
        for t in tests {
            let got: Vec<(TokenKind, String)> =
                lex(t.input).map(|tok| (tok.kind, tok.value)).collect();
            let expected: Vec<(TokenKind, String)> = t
                .out
                .into_iter()
                .map(|(k, v)| (k, v.to_owned()))
                .collect();
            assert_eq!(got, expected, "input: {:?}", t.input);
        }
    }

    #[test]
    fn lex_rules() {
        let tests = vec![
            TestCase {
                input: "prgm <- 'a'",
                out: vec![
                    (Identifier, "prgm"),
                    (Whitespace, " "),
                    (Assignment, "<-"),
                    (Whitespace, " "),
                    (Literal, "a"),
                    (EndOfInput, ""),
                ],
            },
            TestCase {
                input: "prgm <- ~'-?\\d+.?\\d*'",
                out: vec![
                    (Identifier, "prgm"),
                    (Whitespace, " "),
                    (Assignment, "<-"),
                    (Whitespace, " "),
                    (Regex, "-?\\d+.?\\d*"),
                    (EndOfInput, ""),
                ],
            },
            TestCase {
                input: "prgm <- a b \n a <- 'c'\n\tb <- ~'\\d+'",
                out: vec![
                    (Identifier, "prgm"),
                    (Whitespace, " "),
                    (Assignment, "<-"),
                    (Whitespace, " "),
                    (Identifier, "a"),
                    (Whitespace, " "),
                    (Identifier, "b"),
                    (Whitespace, " "),
                    (Newline, "\n"),
                    (Whitespace, " "),
                    (Identifier, "a"),
                    (Whitespace, " "),
                    (Assignment, "<-"),
                    (Whitespace, " "),
                    (Literal, "c"),
                    (Newline, "\n"),
                    (Whitespace, "\t"),
                    (Identifier, "b"),
                    (Whitespace, " "),
                    (Assignment, "<-"),
                    (Whitespace, " "),
                    (Regex, "\\d+"),
                    (EndOfInput, ""),
                ],
            },
        ];
        assert_test_cases(tests);
    }

    #[test]
    fn lex_operators() {
        let tests = vec![TestCase {
            input: "item <- a* b+ c? / _",
            out: vec![
                (Identifier, "item"),
                (Whitespace, " "),
                (Assignment, "<-"),
                (Whitespace, " "),
                (Identifier, "a"),
                (Star, "*"),
                (Whitespace, " "),
                (Identifier, "b"),
                (Plus, "+"),
                (Whitespace, " "),
                (Identifier, "c"),
                (Optional, "?"),
                (Whitespace, " "),
                (Alternate, "/"),
                (Whitespace, " "),
                (Identifier, "_"),
                (EndOfInput, ""),
            ],
        }];
        assert_test_cases(tests);
    }

    #[test]
    fn lex_escaped_quotes() {
        let tests = vec![
            TestCase {
                input: "'it\\'s'",
                out: vec![(Literal, "it\\'s"), (EndOfInput, "")],
            },
            TestCase {
                input: "~'[^\\']+'",
                out: vec![(Regex, "[^\\']+"), (EndOfInput, "")],
            },
            // A backslash before anything but a quote is just a backslash.
            TestCase {
                input: "'\\n'",
                out: vec![(Literal, "\\n"), (EndOfInput, "")],
            },
        ];
        assert_test_cases(tests);
    }

    #[test]
    fn lex_errors() {
        let tests = vec![
            TestCase {
                input: "a < b",
                out: vec![(Identifier, "a"), (Whitespace, " "), (Error, "expected <-")],
            },
            TestCase {
                input: "a <- 'abc",
                out: vec![
                    (Identifier, "a"),
                    (Whitespace, " "),
                    (Assignment, "<-"),
                    (Whitespace, " "),
                    (Error, "eof while parsing literal"),
                ],
            },
            TestCase {
                input: "~'abc\\'",
                out: vec![(Error, "eof while parsing regex")],
            },
            TestCase {
                input: "~abc",
                out: vec![(Error, "expected \"'\" after ~")],
            },
        ];
        assert_test_cases(tests);
    }

    #[test]
    fn lex_stops_silently_on_unknown_char() {
        let tests = vec![
            TestCase {
                input: "a <- 'b' ; c <- 'd'",
                out: vec![
                    (Identifier, "a"),
                    (Whitespace, " "),
                    (Assignment, "<-"),
                    (Whitespace, " "),
                    (Literal, "b"),
                    (Whitespace, " "),
                ],
            },
            TestCase {
                input: "a\r\n",
                out: vec![(Identifier, "a")],
            },
        ];
        assert_test_cases(tests);
    }

    #[test]
    fn token_offsets() {
        let toks: Vec<Token> = lex("ab <- 'cd' ~'e'").collect();
        let offsets: Vec<usize> = toks.iter().map(|t| t.offset).collect();
        assert_eq!(offsets, vec![0, 2, 3, 5, 7, 10, 13, 15]);

        let err = lex("ab <- 'cd").last().unwrap();
        assert_eq!(err.kind, Error);
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn snippets() {
        let input = "a <- 'b\nc <- 'a very long literal value'";
        let lexer = lex(input);
        let tests = vec![
            (5, "'b"),
            (0, "a <- 'b"),
            (8, "c <- 'a very lon"),
            (7, ""),
            (100, ""),
        ];
        for test in tests {
            assert_eq!(lexer.snippet(test.0), test.1, "test case: {:?}", test);
        }
    }

    #[test]
    fn unicode_identifiers() {
        let toks: Vec<Token> = lex("größe <- 'x'").collect();
        assert_eq!(toks[0].value, "größe");
        assert_eq!(toks[1].offset, "größe".len());
    }
}
