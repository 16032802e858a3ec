// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Syntax definitions for the Unholy language.
//!
//! This crate defines the pieces shared between the scanner, the parser,
//! and every downstream consumer of a parsed tree: the [`SyntaxKind`]
//! enumeration, the scanner's token record ([`SemanticElement`]), source
//! position utilities, and the AST arena.

pub mod kind;
pub mod node;
pub mod span;
pub mod token;

pub use kind::SyntaxKind;
pub use node::{Node, NodeArray, NodeData, NodeFlag, NodeFlags, SyntaxTree};
pub use span::{LineMap, Span};
pub use token::SemanticElement;

/// Index handle into a [`SyntaxTree`] arena.
///
/// Parent links are stored as plain ids, never as owning edges, so the
/// tree stays acyclic from an ownership point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}
