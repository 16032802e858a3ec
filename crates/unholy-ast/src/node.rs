// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The AST arena.
//!
//! Nodes live in a flat `Vec` owned by [`SyntaxTree`]; children reference
//! each other through [`NodeId`] handles. The `parent` field is a plain
//! back-reference, so the only ownership edge runs root-to-leaf and no
//! reference counting is needed.

use enumflags2::{bitflags, BitFlags};

use crate::{NodeId, Span, SyntaxKind};

/// Error markers on a node.
///
/// With fatal-first error propagation these are rarely set today; they are
/// the hook for per-statement recovery, and blocks already propagate
/// `ChildHasError` upward.
#[bitflags]
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFlag {
    HasError = 1 << 0,
    ChildHasError = 1 << 1,
}

pub type NodeFlags = BitFlags<NodeFlag>;

/// AST node header shared by every variant.
///
/// `line`/`column`/`pos` are captured from the node's first token when the
/// production opens; `length` is fixed when the production finishes, so a
/// child's `[pos, pos + length)` always nests inside its parent's.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: SyntaxKind,
    pub data: NodeData,
    pub line: u32,
    pub column: u32,
    pub pos: usize,
    pub length: usize,
    pub flags: NodeFlags,
    /// Unset only for the root `SourceFile`.
    pub parent: Option<NodeId>,
}

impl Node {
    pub fn end(&self) -> usize {
        self.pos + self.length
    }

    pub fn span(&self) -> Span {
        Span::new(self.pos, self.end())
    }
}

/// Variant payload of a node. One arm per producible construct.
#[derive(Debug, Clone)]
pub enum NodeData {
    /// A node whose production is still running. Present only while the
    /// parser is mid-build; a finished tree never contains one.
    Incomplete,
    /// Name expression. The node kind is `Identifier`.
    Identifier { name: String },
    /// Integer literal, kept as text; radix interpretation and overflow
    /// checks belong to a later stage. The node kind is `IntegerLiteral`.
    IntegerLiteral { text: String },
    /// Boolean literal. The node kind is `TrueKeyword` or `FalseKeyword`.
    BoolLiteral,
    /// Keyword type. The node kind is `BoolKeyword`, `IntKeyword`, or
    /// `VoidKeyword`.
    KeywordType,
    /// A bare token lifted into the tree, e.g. a binary operator.
    Token,
    Binary {
        left: NodeId,
        operator: NodeId,
        right: NodeId,
    },
    Call {
        callee: NodeId,
        args: NodeArray,
    },
    VarDecl {
        name: NodeId,
        ty: Option<NodeId>,
        initializer: Option<NodeId>,
    },
    ParameterDecl {
        name: NodeId,
        ty: NodeId,
    },
    FuncDecl {
        name: NodeId,
        params: NodeArray,
        ty: NodeId,
        body: NodeId,
    },
    Block {
        statements: NodeArray,
    },
    VarDeclStmt {
        declaration: NodeId,
    },
    FuncDeclStmt {
        declaration: NodeId,
    },
    ExprStmt {
        expression: NodeId,
    },
    If {
        condition: NodeId,
        then_statement: NodeId,
        else_statement: Option<NodeId>,
    },
    Return {
        expression: Option<NodeId>,
    },
    SourceFile {
        file_name: String,
        statements: NodeArray,
    },
}

/// An ordered child list carrying its own position, captured when the
/// list is opened.
#[derive(Debug, Clone)]
pub struct NodeArray {
    pub items: Vec<NodeId>,
    pub line: u32,
    pub column: u32,
    pub pos: usize,
    pub length: usize,
}

impl NodeArray {
    pub fn new(line: u32, column: u32, pos: usize) -> Self {
        Self {
            items: Vec::new(),
            line,
            column,
            pos,
            length: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.items.iter().copied()
    }
}

/// A parsed file: the node arena plus the id of its `SourceFile` root.
///
/// Immutable once the parser returns it; freely shareable by read-only
/// consumers.
#[derive(Debug, Default)]
pub struct SyntaxTree {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl SyntaxTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// The `SourceFile` root. Panics only on a tree no parser produced:
    /// every successful parse sets the root before returning.
    pub fn root(&self) -> NodeId {
        self.root.expect("tree has no root; was it produced by a parser?")
    }

    pub fn root_node(&self) -> &Node {
        self.node(self.root())
    }

    pub fn file_name(&self) -> &str {
        match &self.root_node().data {
            NodeData::SourceFile { file_name, .. } => file_name,
            _ => "",
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Child ids of `id` in source order.
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        match &self.node(id).data {
            NodeData::Incomplete
            | NodeData::Identifier { .. }
            | NodeData::IntegerLiteral { .. }
            | NodeData::BoolLiteral
            | NodeData::KeywordType
            | NodeData::Token => {}
            NodeData::Binary {
                left,
                operator,
                right,
            } => out.extend([*left, *operator, *right]),
            NodeData::Call { callee, args } => {
                out.push(*callee);
                out.extend(args.iter());
            }
            NodeData::VarDecl {
                name,
                ty,
                initializer,
            } => {
                out.push(*name);
                out.extend(ty.iter().copied());
                out.extend(initializer.iter().copied());
            }
            NodeData::ParameterDecl { name, ty } => out.extend([*name, *ty]),
            NodeData::FuncDecl {
                name,
                params,
                ty,
                body,
            } => {
                out.push(*name);
                out.extend(params.iter());
                out.push(*ty);
                out.push(*body);
            }
            NodeData::Block { statements } => out.extend(statements.iter()),
            NodeData::VarDeclStmt { declaration } | NodeData::FuncDeclStmt { declaration } => {
                out.push(*declaration)
            }
            NodeData::ExprStmt { expression } => out.push(*expression),
            NodeData::If {
                condition,
                then_statement,
                else_statement,
            } => {
                out.extend([*condition, *then_statement]);
                out.extend(else_statement.iter().copied());
            }
            NodeData::Return { expression } => out.extend(expression.iter().copied()),
            NodeData::SourceFile { statements, .. } => out.extend(statements.iter()),
        }
        out
    }

    /// Pre-order traversal from `id`.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![id];
        let mut stack = self.children(id);
        stack.reverse();
        while let Some(next) = stack.pop() {
            out.push(next);
            let mut kids = self.children(next);
            kids.reverse();
            stack.extend(kids);
        }
        out
    }
}
