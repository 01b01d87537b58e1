//! Abstract Syntax Tree (AST) for Fish programs.
//!
//! The tree is generic: every node is a [`NodeKind`] tag, an optional textual
//! payload (a name, literal text or operator symbol) and an ordered list of
//! owned children. The parser builds it once, top-down; nothing mutates it
//! afterwards.

use serde::Serialize;
use std::fmt;

/// Primitive types of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Type {
    /// `<int`
    Int,
    /// `<string`
    String,
    /// `<charal`
    Char,
    /// `<bubble`
    Float,
    /// `<hook`
    Bool,
}

impl Type {
    /// All primitive types, in declaration order.
    pub const ALL: [Type; 5] = [Type::Int, Type::String, Type::Char, Type::Float, Type::Bool];

    /// Source-level name, as stored in `Type` nodes.
    pub fn name(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::String => "string",
            Type::Char => "charal",
            Type::Float => "bubble",
            Type::Bool => "hook",
        }
    }

    /// The keyword spelling, including the leading `<`.
    pub fn keyword(&self) -> &'static str {
        match self {
            Type::Int => "<int",
            Type::String => "<string",
            Type::Char => "<charal",
            Type::Float => "<bubble",
            Type::Bool => "<hook",
        }
    }

    /// Parse a type name, with or without the leading `<`.
    pub fn from_keyword(s: &str) -> Option<Type> {
        let name = s.strip_prefix('<').unwrap_or(s);
        Type::ALL.iter().copied().find(|ty| ty.name() == name)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Node category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum NodeKind {
    /// The whole `fish { ... }` unit
    Program,
    /// Statement list of a `{ ... }` body
    Block,
    /// Variable declaration: `Type` and an optional `Initializer`
    Declaration,
    /// Wraps the initial value of a declaration
    Initializer,
    /// Type annotation; value is the type name without `<`
    Type,
    /// Function definition: `Params`, return `Type`, `Block`
    FunctionDef,
    /// Parameter list
    Params,
    /// One parameter with its `Type` child
    Param,
    /// `if` with condition, then-block and optional else-block
    If,
    /// `whale` loop
    While,
    /// `fork` loop: init, condition, step, body
    For,
    /// `try`/`catch`/`finally`
    TryCatch,
    /// `splash`
    Print,
    /// `emerge`, with an optional expression
    Return,
    /// Assignment to the named variable
    Assign,
    /// Call of the named function with an `Args` child
    Call,
    /// Argument list
    Args,
    /// Binary operator; value is the symbol
    BinaryOp,
    /// Prefix minus
    UnaryOp,
    /// `<++` or `<--`
    PostfixOp,
    /// Variable reference
    Var,
    /// Integer or float literal
    Num,
    /// String literal, without quotes
    String,
    /// Character literal, without quotes
    Char,
    /// Placeholder for an absent `for` clause
    Empty,
}

impl NodeKind {
    /// Variant name as it appears in the S-expression rendering.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Program => "Program",
            NodeKind::Block => "Block",
            NodeKind::Declaration => "Declaration",
            NodeKind::Initializer => "Initializer",
            NodeKind::Type => "Type",
            NodeKind::FunctionDef => "FunctionDef",
            NodeKind::Params => "Params",
            NodeKind::Param => "Param",
            NodeKind::If => "If",
            NodeKind::While => "While",
            NodeKind::For => "For",
            NodeKind::TryCatch => "TryCatch",
            NodeKind::Print => "Print",
            NodeKind::Return => "Return",
            NodeKind::Assign => "Assign",
            NodeKind::Call => "Call",
            NodeKind::Args => "Args",
            NodeKind::BinaryOp => "BinaryOp",
            NodeKind::UnaryOp => "UnaryOp",
            NodeKind::PostfixOp => "PostfixOp",
            NodeKind::Var => "Var",
            NodeKind::Num => "Num",
            NodeKind::String => "String",
            NodeKind::Char => "Char",
            NodeKind::Empty => "Empty",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A node of the syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Node category
    pub kind: NodeKind,
    /// Name, literal text or operator symbol
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Owned children, in source order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Source line (0 when unknown)
    pub line: usize,
}

impl Node {
    /// Create a node without payload or children.
    pub fn new(kind: NodeKind, line: usize) -> Self {
        Self {
            kind,
            value: None,
            children: Vec::new(),
            line,
        }
    }

    /// Create a childless node carrying a payload.
    pub fn leaf(kind: NodeKind, value: impl Into<String>, line: usize) -> Self {
        Self::new(kind, line).with_value(value)
    }

    /// Set the payload.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Append one child.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Append children in order.
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Variable reference.
    pub fn var(name: impl Into<String>, line: usize) -> Self {
        Self::leaf(NodeKind::Var, name, line)
    }

    /// Numeric literal.
    pub fn num(text: impl Into<String>, line: usize) -> Self {
        Self::leaf(NodeKind::Num, text, line)
    }

    /// Type annotation.
    pub fn type_node(ty: Type, line: usize) -> Self {
        Self::leaf(NodeKind::Type, ty.name(), line)
    }

    /// Binary operation; the line is taken from the left operand.
    pub fn binary(op: &str, lhs: Node, rhs: Node) -> Self {
        let line = lhs.line;
        Self::leaf(NodeKind::BinaryOp, op, line)
            .with_child(lhs)
            .with_child(rhs)
    }

    /// Placeholder for an omitted clause.
    pub fn empty(line: usize) -> Self {
        Self::new(NodeKind::Empty, line)
    }

    /// The payload, or `""` when absent.
    pub fn value_str(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    /// The i-th child, if present.
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// The primitive type named by a `Type` node.
    pub fn as_type(&self) -> Option<Type> {
        match self.kind {
            NodeKind::Type => self.value.as_deref().and_then(Type::from_keyword),
            _ => None,
        }
    }

    /// Visit every node in pre-order.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Node)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Total number of nodes in this subtree.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |_| count += 1);
        count
    }

    /// Indented multi-line rendering, one node per line.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_into(&mut out, 0);
        out
    }

    fn pretty_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(self.kind.name());
        if let Some(ref value) = self.value {
            out.push_str(": ");
            out.push_str(value);
        }
        out.push('\n');
        for child in &self.children {
            child.pretty_into(out, depth + 1);
        }
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if self.value.is_none() && self.children.is_empty() {
            return Ok(());
        }
        write!(f, "(")?;
        let mut first = true;
        if let Some(ref value) = self.value {
            write!(f, "{}", value)?;
            first = false;
        }
        for child in &self.children {
            if !first {
                write!(f, ", ")?;
            }
            write!(f, "{}", child)?;
            first = false;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_names() {
        assert_eq!(Type::Float.to_string(), "bubble");
        assert_eq!(Type::from_keyword("<charal"), Some(Type::Char));
        assert_eq!(Type::from_keyword("hook"), Some(Type::Bool));
        assert_eq!(Type::from_keyword("<double"), None);
    }

    #[test]
    fn test_node_display() {
        let decl = Node::leaf(NodeKind::Declaration, "x", 1)
            .with_child(Node::type_node(Type::Int, 1))
            .with_child(Node::new(NodeKind::Initializer, 1).with_child(Node::num("5", 1)));
        assert_eq!(decl.to_string(), "Declaration(x, Type(int), Initializer(Num(5)))");
        assert_eq!(Node::empty(3).to_string(), "Empty");
    }

    #[test]
    fn test_binary_takes_left_line() {
        let node = Node::binary("-", Node::var("a", 2), Node::var("b", 3));
        assert_eq!(node.line, 2);
        assert_eq!(node.to_string(), "BinaryOp(-, Var(a), Var(b))");
    }

    #[test]
    fn test_pretty() {
        let print = Node::new(NodeKind::Print, 1).with_child(Node::var("x", 1));
        assert_eq!(print.pretty(), "Print\n  Var: x\n");
        assert_eq!(print.node_count(), 2);
    }
}
