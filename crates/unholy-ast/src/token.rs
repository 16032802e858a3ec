// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The scanner's output record.

use crate::{Span, SyntaxKind};

/// A lexical unit with its exact source position.
///
/// `line` and `column` are 1-based and captured at the token's first byte;
/// `pos` is the 0-based byte offset of that byte and `length` the token's
/// byte length. The end-of-file element has `length == 0` and `pos` one past
/// the last byte of the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SemanticElement {
    pub kind: SyntaxKind,
    pub line: u32,
    pub column: u32,
    pub pos: usize,
    pub length: usize,
    /// The exact source slice this element covers.
    pub raw_text: String,
    /// Normalized text for literals. Equal to `raw_text` for this grammar;
    /// a later radix-prefix extension will diverge here.
    pub value: Option<String>,
}

impl SemanticElement {
    /// Byte offset one past the last byte of this element.
    pub fn end(&self) -> usize {
        self.pos + self.length
    }

    pub fn span(&self) -> Span {
        Span::new(self.pos, self.end())
    }

    /// Returns the element's text if it has one, or the kind's display
    /// name. Used when naming an offending token in an error message.
    pub fn describe(&self) -> String {
        if self.raw_text.is_empty() {
            self.kind.display_name().to_string()
        } else {
            format!("'{}'", self.raw_text)
        }
    }
}

impl Default for SemanticElement {
    /// A zero-width placeholder at the start of the file, used before the
    /// first token has been consumed.
    fn default() -> Self {
        Self {
            kind: SyntaxKind::Unknown,
            line: 1,
            column: 1,
            pos: 0,
            length: 0,
            raw_text: String::new(),
            value: None,
        }
    }
}
