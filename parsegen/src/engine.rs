use log::{error, trace};

use crate::error::{Expected, Furthest, ParseError};
use crate::graph::{Graph, NodeId, NodeKind};
use crate::source::Source;
use crate::tree::ParseTree;

const RED_ZONE: usize = 100 * 1024;
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first moving to a fresh stack segment if less than `RED_ZONE` is
/// left on the current one.
fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

/// Result of a successful match.
///
/// `tree` is `None` when the match contributes nothing to its parent, e.g. a
/// star matching zero times or an optional that didn't match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    pub tree: Option<ParseTree>,
    pub len: usize,
}

/// Runs a resolved graph against a source.
///
/// A matcher holds no cursor. The only state it carries between calls is the
/// furthest failure, for diagnostics.
pub struct Matcher<'g, 's> {
    graph: &'g Graph,
    source: &'s Source,
    furthest: Furthest,
}

impl<'g, 's> Matcher<'g, 's> {
    pub fn new(graph: &'g Graph, source: &'s Source) -> Self {
        Matcher {
            graph,
            source,
            furthest: Furthest::default(),
        }
    }

    /// Try to match `id` starting at `pos`. Failures are recorded and
    /// reported as `None`; nothing is consumed on failure.
    pub fn match_node(&mut self, id: NodeId, pos: usize) -> Option<Match> {
        // Recursive grammars nest as deep as their input does.
        ensure_sufficient_stack(|| self.match_kind(id, pos))
    }

    fn match_kind(&mut self, id: NodeId, pos: usize) -> Option<Match> {
        let graph = self.graph;
        let node = &graph[id];
        trace!("{} {} at {}", node.kind.label(), node.name, pos);

        match &node.kind {
            NodeKind::Literal(lit) => match self.source.match_literal(pos, lit) {
                Some(m) => Some(Match {
                    tree: Some(ParseTree::terminal(node.name.as_str(), m)),
                    len: m.len(),
                }),
                None => {
                    self.furthest.record(pos, Expected::Literal(lit.clone()));
                    None
                }
            },
            NodeKind::Regex(pattern) => match self.source.match_pattern(pos, pattern) {
                Some(m) => Some(Match {
                    tree: Some(ParseTree::terminal(node.name.as_str(), m)),
                    len: m.len(),
                }),
                None => {
                    self.furthest
                        .record(pos, Expected::Pattern(pattern.as_str().to_owned()));
                    None
                }
            },
            NodeKind::Reference { target, resolved } => match resolved {
                Some(resolved) => self.match_node(*resolved, pos),
                None => {
                    error!("reference to '{}' was never resolved", target);
                    None
                }
            },
            NodeKind::Sequence(children) => {
                let mut len = 0;
                let mut trees = Vec::with_capacity(children.len());
                for &child in children {
                    let m = self.match_node(child, pos + len)?;
                    len += m.len;
                    trees.extend(m.tree);
                }
                Some(Match {
                    tree: Some(ParseTree::node(node.name.as_str(), trees)),
                    len,
                })
            }
            NodeKind::Alternate(left, right) => self
                .match_node(*left, pos)
                .or_else(|| self.match_node(*right, pos)),
            NodeKind::Star { child, wrapper } => {
                let (_, m) = self.repeat(*child, wrapper, pos);
                Some(m)
            }
            NodeKind::Plus { child, wrapper } => match self.repeat(*child, wrapper, pos) {
                (0, _) => None,
                (_, m) => Some(m),
            },
            NodeKind::Optional(child) => Some(self.match_node(*child, pos).unwrap_or_default()),
        }
    }

    /// Greedily match `child` until it fails. Returns the number of matches.
    ///
    /// A match consuming nothing ends the repetition, it would otherwise
    /// repeat forever.
    fn repeat(&mut self, child: NodeId, wrapper: &str, pos: usize) -> (usize, Match) {
        let mut count = 0;
        let mut len = 0;
        let mut trees = Vec::new();
        while let Some(m) = self.match_node(child, pos + len) {
            if m.len == 0 {
                if count == 0 {
                    count = 1;
                    trees.extend(m.tree);
                }
                break;
            }
            count += 1;
            len += m.len;
            trees.extend(m.tree);
        }

        // A single repetition isn't wrapped.
        let tree = match trees.len() {
            0 => None,
            1 => trees.pop(),
            _ => Some(ParseTree::node(wrapper, trees)),
        };
        (count, Match { tree, len })
    }

    /// Consume the matcher, returning the furthest failure seen.
    pub fn into_error(self) -> ParseError {
        self.furthest.into_error()
    }
}

/// Match `root` against `source` from `pos`.
pub fn run(graph: &Graph, root: NodeId, source: &Source, pos: usize) -> Result<Match, ParseError> {
    let mut matcher = Matcher::new(graph, source);
    match matcher.match_node(root, pos) {
        Some(m) => Ok(m),
        None => Err(matcher.into_error()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(ty: &str, data: &str) -> ParseTree {
        ParseTree::terminal(ty, data)
    }

    fn n(ty: &str, children: Vec<ParseTree>) -> ParseTree {
        ParseTree::node(ty, children)
    }

    #[test]
    fn literal() {
        let mut g = Graph::new();
        let lit = g.literal("name", "lit");

        let m = run(&g, lit, &"lit".into(), 0).unwrap();
        assert_eq!(m.len, 3);
        assert_eq!(m.tree, Some(t("name", "lit")));

        let err = run(&g, lit, &"lot".into(), 0).unwrap_err();
        assert_eq!(
            err,
            ParseError::NoMatch {
                position: 0,
                expected: vec![Expected::Literal(b"lit".to_vec())],
            }
        );
    }

    #[test]
    fn literal_at_offset() {
        let mut g = Graph::new();
        let lit = g.literal("b", "b");
        let m = run(&g, lit, &"ab".into(), 1).unwrap();
        assert_eq!(m.tree, Some(t("b", "b")));
        assert!(run(&g, lit, &"ab".into(), 5).is_err());
    }

    #[test]
    fn regex_is_anchored() {
        let mut g = Graph::new();
        let num = g.regex("num", "\\d+").unwrap();

        let m = run(&g, num, &"123abc".into(), 0).unwrap();
        assert_eq!(m.len, 3);
        assert_eq!(m.tree, Some(t("num", "123")));
        assert!(run(&g, num, &"abc123".into(), 0).is_err());
    }

    #[test]
    fn sequence_all_or_nothing() {
        let mut g = Graph::new();
        let a = g.literal("name", "a");
        let b = g.literal("name", "b");
        let seq = g.sequence("name", vec![a, b]);

        let m = run(&g, seq, &"ab".into(), 0).unwrap();
        assert_eq!(m.len, 2);
        assert_eq!(m.tree, Some(n("name", vec![t("name", "a"), t("name", "b")])));

        let err = run(&g, seq, &"ac".into(), 0).unwrap_err();
        assert_eq!(
            err,
            ParseError::NoMatch {
                position: 1,
                expected: vec![Expected::Literal(b"b".to_vec())],
            }
        );
    }

    #[test]
    fn alternate_tries_right_after_left() {
        let mut g = Graph::new();
        let a = g.literal("a", "a");
        let b = g.literal("b", "b");
        let alt = g.alternate("item", a, b);

        let m = run(&g, alt, &"b".into(), 0).unwrap();
        assert_eq!(m.tree, Some(t("b", "b")));
        let m = run(&g, alt, &"a".into(), 0).unwrap();
        assert_eq!(m.tree, Some(t("a", "a")));

        let err = run(&g, alt, &"c".into(), 0).unwrap_err();
        assert_eq!(
            err,
            ParseError::NoMatch {
                position: 0,
                expected: vec![
                    Expected::Literal(b"a".to_vec()),
                    Expected::Literal(b"b".to_vec()),
                ],
            }
        );
    }

    #[test]
    fn alternate_commits_to_first_success() {
        // s <- x 'b' with x <- 'a' / 'ab'.
        let mut g = Graph::new();
        let a = g.literal("x", "a");
        let ab = g.literal("x", "ab");
        let x = g.alternate("x", a, ab);
        let b = g.literal("s", "b");
        let s = g.sequence("s", vec![x, b]);

        assert!(run(&g, s, &"ab".into(), 0).is_ok());
        let m = run(&g, s, &"abb".into(), 0).unwrap();
        assert_eq!(m.len, 2);

        // With x <- 'ab' / 'a', "ab" fails: once 'ab' matched the choice
        // is never revisited to let the trailing 'b' match.
        let mut g = Graph::new();
        let ab = g.literal("x", "ab");
        let a = g.literal("x", "a");
        let x = g.alternate("x", ab, a);
        let b = g.literal("s", "b");
        let s = g.sequence("s", vec![x, b]);
        assert!(run(&g, s, &"ab".into(), 0).is_err());
    }

    #[test]
    fn star_unwraps_single_match() {
        let mut g = Graph::new();
        let x = g.literal("x", "x");
        let star = g.star("prgm", x);

        let m = run(&g, star, &"".into(), 0).unwrap();
        assert_eq!(m, Match { tree: None, len: 0 });

        let m = run(&g, star, &"x".into(), 0).unwrap();
        assert_eq!(m.tree, Some(t("x", "x")));

        let m = run(&g, star, &"xxy".into(), 0).unwrap();
        assert_eq!(m.len, 2);
        assert_eq!(m.tree, Some(n("x*", vec![t("x", "x"), t("x", "x")])));
    }

    #[test]
    fn plus_requires_one() {
        let mut g = Graph::new();
        let a = g.literal("a", "a");
        let plus = g.plus("prgm", a);

        assert!(run(&g, plus, &"".into(), 0).is_err());
        let m = run(&g, plus, &"a".into(), 0).unwrap();
        assert_eq!(m.tree, Some(t("a", "a")));
        let m = run(&g, plus, &"aaa".into(), 0).unwrap();
        assert_eq!(
            m.tree,
            Some(n("a+", vec![t("a", "a"), t("a", "a"), t("a", "a")]))
        );
    }

    #[test]
    fn star_stops_on_empty_match() {
        let mut g = Graph::new();
        let e = g.regex("e", "x*").unwrap();
        let star = g.star("prgm", e);

        let m = run(&g, star, &"yyy".into(), 0).unwrap();
        assert_eq!(m.len, 0);
        assert_eq!(m.tree, Some(t("e", "")));
    }

    #[test]
    fn optional_contributes_nothing_on_failure() {
        let mut g = Graph::new();
        let a = g.literal("s", "a");
        let b = g.literal("s", "b");
        let opt = g.optional("s", a);
        let seq = g.sequence("s", vec![opt, b]);

        let m = run(&g, seq, &"b".into(), 0).unwrap();
        assert_eq!(m.tree, Some(n("s", vec![t("s", "b")])));
        let m = run(&g, seq, &"ab".into(), 0).unwrap();
        assert_eq!(m.tree, Some(n("s", vec![t("s", "a"), t("s", "b")])));
    }

    #[test]
    fn reference_is_not_renamed() {
        let mut g = Graph::new();
        let r = g.reference("prgm", "a");
        let a = g.literal("a", "a");
        g.resolve(r, a);

        let m = run(&g, r, &"a".into(), 0).unwrap();
        assert_eq!(m.tree, Some(t("a", "a")));
    }

    #[test]
    fn deeply_nested_input() {
        // nest <- '(' nest? ')'
        let mut g = Graph::new();
        let open = g.literal("nest", "(");
        let r = g.reference("nest", "nest");
        let opt = g.optional("nest", r);
        let close = g.literal("nest", ")");
        let nest = g.sequence("nest", vec![open, opt, close]);
        g.resolve(r, nest);

        let depth = 20_000;
        let input = format!("{}{}", "(".repeat(depth), ")".repeat(depth));
        let m = run(&g, nest, &input.as_str().into(), 0).unwrap();
        assert_eq!(m.len, 2 * depth);
    }

    #[test]
    fn unresolved_reference_fails() {
        let mut g = Graph::new();
        let r = g.reference("prgm", "a");
        assert!(run(&g, r, &"a".into(), 0).is_err());
    }
}
