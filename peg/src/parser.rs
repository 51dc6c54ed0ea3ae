use log::debug;
use parsegen::{Graph, NodeId};

use crate::error::Error;
use crate::lexer::{Lexer, Token, TokenKind};

/// A named rule and the node its body compiled to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub name: String,
    pub node: NodeId,
}

/// Build every rule in `input`. References are left unresolved.
pub fn parse(input: &str) -> Result<(Graph, Vec<Rule>), Error> {
    let mut builder = Builder {
        tokens: Lexer::new(input),
        graph: Graph::new(),
        rules: Vec::new(),
    };
    builder.grammar()?;
    Ok((builder.graph, builder.rules))
}

struct Builder<'a> {
    tokens: Lexer<'a>,
    graph: Graph,
    rules: Vec<Rule>,
}

impl<'a> Builder<'a> {
    /// Next token, turning lexer errors into compile errors. `None` means the
    /// lexer stopped, which is treated like end of input.
    fn next(&mut self) -> Result<Option<Token>, Error> {
        match self.tokens.next_token() {
            Some(token) if token.kind == TokenKind::Error => Err(Error::Lex {
                text: self.tokens.snippet(token.offset).to_owned(),
                message: token.value,
                offset: token.offset,
            }),
            token => Ok(token),
        }
    }

    fn grammar(&mut self) -> Result<(), Error> {
        while let Some(token) = self.next()? {
            match token.kind {
                TokenKind::Identifier => self.rule(token)?,
                TokenKind::Whitespace | TokenKind::Newline => (),
                TokenKind::EndOfInput => break,
                _ => {
                    return Err(Error::UnexpectedToken {
                        expected: "rule name",
                        token,
                    })
                }
            }
        }
        Ok(())
    }

    fn rule(&mut self, name: Token) -> Result<(), Error> {
        loop {
            let token = self.next()?.ok_or(Error::UnexpectedEnd { expected: "<-" })?;
            match token.kind {
                TokenKind::Whitespace => (),
                TokenKind::Assignment => break,
                _ => {
                    return Err(Error::UnexpectedToken {
                        expected: "<-",
                        token,
                    })
                }
            }
        }

        let mut body = Body::new(name.value.clone());
        loop {
            let token = match self.next()? {
                Some(token) => token,
                None => break,
            };
            match token.kind {
                TokenKind::Whitespace => (),
                TokenKind::Literal => {
                    let lit = unescape_literal(&token.value);
                    let node = self.graph.literal(body.name.as_str(), lit);
                    body.atom(&mut self.graph, node);
                }
                TokenKind::Regex => {
                    let pattern = token.value.replace("\\'", "'");
                    let node = self
                        .graph
                        .regex(body.name.as_str(), &pattern)
                        .map_err(|e| Error::Regex {
                            pattern,
                            offset: token.offset,
                            message: e.to_string(),
                        })?;
                    body.atom(&mut self.graph, node);
                }
                TokenKind::Identifier => {
                    let node = self.graph.reference(body.name.as_str(), token.value);
                    body.atom(&mut self.graph, node);
                }
                TokenKind::Star | TokenKind::Plus | TokenKind::Optional => {
                    body.postfix(&mut self.graph, token)?
                }
                TokenKind::Alternate => body.alternate(&mut self.graph, token)?,
                TokenKind::Newline | TokenKind::EndOfInput => break,
                TokenKind::Assignment | TokenKind::Error => {
                    return Err(Error::UnexpectedToken {
                        expected: "atom",
                        token,
                    })
                }
            }
        }

        match body.finish(&mut self.graph)? {
            Some(node) => self.define(name, node),
            None => {
                debug!("discarding empty rule {}", name.value);
                Ok(())
            }
        }
    }

    fn define(&mut self, name: Token, node: NodeId) -> Result<(), Error> {
        if self.rules.iter().any(|r| r.name == name.value) {
            return Err(Error::DuplicateRule {
                name: name.value,
                offset: name.offset,
            });
        }
        debug!("built rule {} ({})", name.value, self.graph[node].kind.label());
        self.rules.push(Rule {
            name: name.value,
            node,
        });
        Ok(())
    }
}

/// Where a rule body is with respect to a `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Alt {
    None,
    /// Seen `left /`, waiting for the right atom.
    WantRight(NodeId),
    /// Right atom is the last part. It's folded into an alternate once
    /// nothing can postfix it anymore.
    HaveRight(NodeId),
}

/// The atoms of a rule body read so far.
struct Body {
    name: String,
    parts: Vec<NodeId>,
    alt: Alt,
    /// Whether the last part can still take a postfix operator.
    postfix_ok: bool,
}

impl Body {
    fn new(name: String) -> Self {
        Body {
            name,
            parts: Vec::new(),
            alt: Alt::None,
            postfix_ok: false,
        }
    }

    fn atom(&mut self, graph: &mut Graph, node: NodeId) {
        self.alt = match self.alt {
            Alt::WantRight(left) => Alt::HaveRight(left),
            Alt::HaveRight(_) => {
                self.fold(graph);
                Alt::None
            }
            Alt::None => Alt::None,
        };
        self.parts.push(node);
        self.postfix_ok = true;
    }

    fn postfix(&mut self, graph: &mut Graph, token: Token) -> Result<(), Error> {
        let last = match self.parts.pop() {
            Some(last) if self.postfix_ok => last,
            _ => {
                return Err(Error::UnexpectedToken {
                    expected: "atom before postfix operator",
                    token,
                })
            }
        };
        let name = self.name.as_str();
        let node = match token.kind {
            TokenKind::Star => graph.star(name, last),
            TokenKind::Plus => graph.plus(name, last),
            _ => graph.optional(name, last),
        };
        self.parts.push(node);
        self.postfix_ok = false;
        Ok(())
    }

    fn alternate(&mut self, graph: &mut Graph, token: Token) -> Result<(), Error> {
        if let Alt::WantRight(_) = self.alt {
            return Err(Error::UnexpectedToken {
                expected: "atom after /",
                token,
            });
        }
        self.fold(graph);
        let left = self.parts.pop().ok_or(Error::UnexpectedToken {
            expected: "atom before /",
            token,
        })?;
        self.alt = Alt::WantRight(left);
        self.postfix_ok = false;
        Ok(())
    }

    /// Replace a completed `left / right` with its alternate node.
    fn fold(&mut self, graph: &mut Graph) {
        if let Alt::HaveRight(left) = self.alt {
            if let Some(right) = self.parts.pop() {
                let node = graph.alternate(self.name.as_str(), left, right);
                self.parts.push(node);
            }
            self.alt = Alt::None;
        }
    }

    /// The node for the whole body, `None` if the body is empty.
    fn finish(mut self, graph: &mut Graph) -> Result<Option<NodeId>, Error> {
        if let Alt::WantRight(_) = self.alt {
            return Err(Error::UnexpectedEnd {
                expected: "atom after /",
            });
        }
        self.fold(graph);

        match self.parts.len() {
            0 => Ok(None),
            // A lone atom becomes the rule, no sequence around it.
            1 => {
                let node = self.parts[0];
                graph.rename(node, self.name.as_str());
                Ok(Some(node))
            }
            _ => Ok(Some(graph.sequence(self.name.as_str(), self.parts))),
        }
    }
}

/// Interpret the escapes the lexer leaves in a literal's value.
fn unescape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escaped = match chars.peek() {
            Some('\'') => '\'',
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            _ => {
                out.push(c);
                continue;
            }
        };
        chars.next();
        out.push(escaped);
    }
    out
}
