// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Error hints - suggestions for fixing common mistakes.
//!
//! Kept separate from the main parser to avoid clutter.

use unholy_ast::{SemanticElement, SyntaxKind};

/// Get a hint for an "expected X" error based on what was found instead.
pub fn for_expected(expected: SyntaxKind, found: &SemanticElement) -> Option<&'static str> {
    match (expected, found.kind) {
        (SyntaxKind::ColonToken, SyntaxKind::EqualsToken) => {
            Some("use ':' for types, '=' for values")
        }
        (SyntaxKind::ColonToken, _) => Some("syntax: name: type"),

        (SyntaxKind::SemicolonToken, _) => Some("statements end with ';'"),

        (SyntaxKind::CloseBraceToken, _) => Some("every '{' needs a matching '}'"),
        (SyntaxKind::OpenBraceToken, _) => Some("blocks start with '{'"),

        (SyntaxKind::CloseParenToken, SyntaxKind::EndOfFileToken) => {
            Some("add ')' to close the parenthesis")
        }
        (SyntaxKind::OpenParenToken, _) => Some("the condition needs parentheses"),

        (SyntaxKind::Identifier, SyntaxKind::IntegerLiteral) => {
            Some("names can't start with a number")
        }
        (SyntaxKind::Identifier, _) => Some("names start with a letter, '_', or '$'"),

        (SyntaxKind::BoolKeyword, _) => Some("try a type: 'bool', 'int', or 'void'"),

        _ => None,
    }
}
