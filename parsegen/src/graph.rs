use std::ops::Index;

use cranelift_entity::{entity_impl, PrimaryMap};

use crate::source::Pattern;

/// Stable handle to a node in a [`Graph`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct NodeId(u32);

entity_impl! { NodeId }

#[derive(Debug, Clone)]
pub enum NodeKind {
    Literal(Vec<u8>),
    Regex(Pattern),
    /// Placeholder for a rule referenced by name. `resolved` is filled in
    /// once every rule has been built.
    Reference {
        target: String,
        resolved: Option<NodeId>,
    },
    Sequence(Vec<NodeId>),
    /// Ordered choice between exactly two operands.
    Alternate(NodeId, NodeId),
    /// Zero or more. `wrapper` is the tree type used when two or more
    /// repetitions matched.
    Star { child: NodeId, wrapper: String },
    /// One or more, see `Star`.
    Plus { child: NodeId, wrapper: String },
    Optional(NodeId),
}

impl NodeKind {
    /// Short description used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Literal(_) => "literal",
            NodeKind::Regex(_) => "regex",
            NodeKind::Reference { .. } => "reference",
            NodeKind::Sequence(_) => "sequence",
            NodeKind::Alternate(..) => "alternate",
            NodeKind::Star { .. } => "star",
            NodeKind::Plus { .. } => "plus",
            NodeKind::Optional(_) => "optional",
        }
    }
}

/// One combinator in a compiled grammar.
#[derive(Debug, Clone)]
pub struct Node {
    /// The rule this node was declared under.
    pub name: String,
    pub kind: NodeKind,
}

/// Arena holding every combinator node of a grammar.
///
/// Nodes refer to each other by [`NodeId`], so recursive rules are just
/// cycles of ids.
#[derive(Debug, Clone)]
pub struct Graph {
    nodes: PrimaryMap<NodeId, Node>,
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            nodes: PrimaryMap::new(),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            name: name.into(),
            kind,
        })
    }

    pub fn literal(&mut self, name: impl Into<String>, lit: impl Into<Vec<u8>>) -> NodeId {
        self.push(name, NodeKind::Literal(lit.into()))
    }

    pub fn regex(&mut self, name: impl Into<String>, pattern: &str) -> Result<NodeId, regex::Error> {
        let pattern = Pattern::new(pattern)?;
        Ok(self.push(name, NodeKind::Regex(pattern)))
    }

    pub fn reference(&mut self, name: impl Into<String>, target: impl Into<String>) -> NodeId {
        self.push(
            name,
            NodeKind::Reference {
                target: target.into(),
                resolved: None,
            },
        )
    }

    pub fn sequence(&mut self, name: impl Into<String>, children: Vec<NodeId>) -> NodeId {
        self.push(name, NodeKind::Sequence(children))
    }

    pub fn alternate(&mut self, name: impl Into<String>, left: NodeId, right: NodeId) -> NodeId {
        self.push(name, NodeKind::Alternate(left, right))
    }

    pub fn star(&mut self, name: impl Into<String>, child: NodeId) -> NodeId {
        let wrapper = format!("{}*", self.operand_name(child));
        self.push(name, NodeKind::Star { child, wrapper })
    }

    pub fn plus(&mut self, name: impl Into<String>, child: NodeId) -> NodeId {
        let wrapper = format!("{}+", self.operand_name(child));
        self.push(name, NodeKind::Plus { child, wrapper })
    }

    pub fn optional(&mut self, name: impl Into<String>, child: NodeId) -> NodeId {
        self.push(name, NodeKind::Optional(child))
    }

    /// The name a node presents when it's repeated. References present as the
    /// rule they point at.
    fn operand_name(&self, id: NodeId) -> &str {
        let node = &self.nodes[id];
        match &node.kind {
            NodeKind::Reference { target, .. } => target,
            _ => &node.name,
        }
    }

    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) {
        self.nodes[id].name = name.into();
    }

    /// Point the reference at `id` to `target`. Anything already holding `id`
    /// sees the resolved reference.
    ///
    /// Returns false if `id` is not a reference.
    pub fn resolve(&mut self, id: NodeId, target: NodeId) -> bool {
        match &mut self.nodes[id].kind {
            NodeKind::Reference { resolved, .. } => {
                *resolved = Some(target);
                true
            }
            _ => false,
        }
    }

    /// Direct children of a node, in match order. References have none, even
    /// once resolved.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        match &self.nodes[id].kind {
            NodeKind::Literal(_) | NodeKind::Regex(_) | NodeKind::Reference { .. } => Vec::new(),
            NodeKind::Sequence(children) => children.clone(),
            NodeKind::Alternate(left, right) => vec![*left, *right],
            NodeKind::Star { child, .. }
            | NodeKind::Plus { child, .. }
            | NodeKind::Optional(child) => vec![*child],
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Graph::new()
    }
}

impl Index<NodeId> for Graph {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id]
    }
}
