// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Parser for the Unholy language.
//!
//! Transforms the scanner's token stream into a fully linked syntax tree.
//! The first lexical or syntactic error aborts the parse; no partial tree
//! is returned.

mod hints;
mod parser;

#[cfg(test)]
mod tests;

pub use parser::{ContextFlag, ParseError, Parser};

use unholy_ast::{SemanticElement, SyntaxTree};
use unholy_scanner::LexError;

/// Any error the front end can produce while turning text into a tree.
#[derive(Debug, thiserror::Error)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    /// The offending token.
    pub fn element(&self) -> &SemanticElement {
        match self {
            SyntaxError::Lex(e) => &e.element,
            SyntaxError::Parse(e) => &e.element,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            SyntaxError::Lex(e) => &e.message,
            SyntaxError::Parse(e) => &e.message,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            SyntaxError::Lex(e) => e.hint.as_deref(),
            SyntaxError::Parse(e) => e.hint.as_deref(),
        }
    }
}

/// Scan and parse `source`, producing the tree rooted at its `SourceFile`.
///
/// The driver composes this with file reading and diagnostic rendering.
pub fn parse_source(file_name: &str, source: &str) -> Result<SyntaxTree, SyntaxError> {
    Parser::new(file_name, source).parse()
}

#[cfg(test)]
mod demo_tests {
    use super::*;

    #[test]
    fn parse_all_demos() {
        let demos_dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
            .parent()
            .unwrap()
            .parent()
            .unwrap()
            .join("demos");

        let mut seen = 0;
        for entry in std::fs::read_dir(&demos_dir).expect("demos directory not found") {
            let path = entry.unwrap().path();
            if path.extension().map(|e| e == "uh").unwrap_or(false) {
                let src = std::fs::read_to_string(&path)
                    .unwrap_or_else(|e| panic!("failed to read {}: {}", path.display(), e));
                let name = path.file_name().unwrap().to_string_lossy();
                let tree = parse_source(&name, &src)
                    .unwrap_or_else(|e| panic!("parse error in {}: {}", path.display(), e));
                assert_eq!(tree.file_name(), name);
                seen += 1;
            }
        }
        assert!(seen > 0, "no .uh demos found in {}", demos_dir.display());
    }
}
