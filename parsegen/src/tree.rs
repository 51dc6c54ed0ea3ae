use std::fmt::{self, Display};

/// A node in the tree produced by a successful parse.
///
/// Terminals carry the bytes they matched and no children. Non-terminals
/// carry children and no bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    ty: String,
    data: Option<Vec<u8>>,
    children: Vec<ParseTree>,
}

impl ParseTree {
    /// Create a terminal holding the matched bytes.
    pub fn terminal(ty: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        ParseTree {
            ty: ty.into(),
            data: Some(data.into()),
            children: Vec::new(),
        }
    }

    /// Create a non-terminal from its children, in match order.
    pub fn node(ty: impl Into<String>, children: Vec<ParseTree>) -> Self {
        ParseTree {
            ty: ty.into(),
            data: None,
            children,
        }
    }

    /// Name of the rule that produced this node, or the repetition type
    /// (`a*`, `a+`) for a repetition wrapper.
    pub fn type_name(&self) -> &str {
        &self.ty
    }

    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Matched bytes as a str, if this is a terminal holding valid utf8.
    pub fn text(&self) -> Option<&str> {
        self.data().and_then(|d| std::str::from_utf8(d).ok())
    }

    pub fn children(&self) -> &[ParseTree] {
        &self.children
    }

    pub fn is_terminal(&self) -> bool {
        self.data.is_some()
    }
}

/// Prints the type of each node on its own line, followed by the quoted data
/// of a terminal. Children are indented by ` |` per level.
impl Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut stack = vec![(self, 0)];
        while let Some((tree, depth)) = stack.pop() {
            let indent = " |".repeat(depth);
            writeln!(f, "{}{}", indent, tree.ty)?;
            if let Some(data) = &tree.data {
                writeln!(f, "{} {:?}", indent, String::from_utf8_lossy(data))?;
            }
            stack.extend(tree.children.iter().rev().map(|child| (child, depth + 1)));
        }
        Ok(())
    }
}

// Trees nest as deep as the input, so children are torn down from a heap
// stack instead of recursively.
impl Drop for ParseTree {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut tree) = stack.pop() {
            stack.append(&mut tree.children);
        }
    }
}
