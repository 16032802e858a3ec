// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! The scanner implementation.
//!
//! A single forward pass over the source bytes, no regex and no generated
//! DFA: the parser speculates through `look_ahead`/`try_scan`, which need
//! the scanner to restore itself to an arbitrary earlier snapshot, so the
//! cursor state is explicit and saved on a LIFO stack.

use unholy_ast::kind::is_future_reserved_word;
use unholy_ast::{SemanticElement, SyntaxKind};

/// Snapshot of the cursor, saved before speculation.
#[derive(Debug, Clone, Copy)]
struct ScannerState {
    pos: usize,
    token_start: usize,
    line: u32,
    line_start: usize,
}

/// The scanner for Unholy source code.
///
/// `pos` is the byte offset of the next character to scan; after
/// `next_token` it sits one past the last byte consumed. `line` is 1-based
/// and `line_start` is the offset of the current line's first byte, so a
/// token's column is `token_start - line_start + 1`.
pub struct Scanner<'a> {
    source: &'a str,
    pos: usize,
    token_start: usize,
    line: u32,
    line_start: usize,
    saved: Vec<ScannerState>,
}

impl<'a> Scanner<'a> {
    /// Create a new scanner over the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            token_start: 0,
            line: 1,
            line_start: 0,
            saved: Vec::new(),
        }
    }

    /// Byte offset one past the last byte consumed.
    pub fn get_pos(&self) -> usize {
        self.pos
    }

    /// The text of the line the scanner currently sits on, for diagnostics.
    pub fn get_line_content(&self) -> &'a str {
        let end = self.source[self.line_start..]
            .find('\n')
            .map(|i| self.line_start + i)
            .unwrap_or(self.source.len());
        &self.source[self.line_start..end]
    }

    /// Advance and return the next element. After the final element this
    /// returns `EndOfFileToken` indefinitely.
    pub fn next_token(&mut self) -> Result<SemanticElement, LexError> {
        loop {
            let Some(b) = self.source.as_bytes().get(self.pos).copied() else {
                self.token_start = self.pos;
                return Ok(self.make_element(SyntaxKind::EndOfFileToken));
            };
            match b {
                b' ' | b'\t' | 0x0B => self.pos += 1,
                b'\n' => {
                    self.pos += 1;
                    self.line += 1;
                    self.line_start = self.pos;
                }
                b'\r' => {
                    self.token_start = self.pos;
                    self.pos += 1;
                    return Err(LexError::carriage_return(
                        self.make_element(SyntaxKind::Unknown),
                    ));
                }
                _ => break,
            }
        }

        self.token_start = self.pos;
        let kind = match self.source.as_bytes()[self.pos] {
            b'{' => self.single(SyntaxKind::OpenBraceToken),
            b'}' => self.single(SyntaxKind::CloseBraceToken),
            b'(' => self.single(SyntaxKind::OpenParenToken),
            b')' => self.single(SyntaxKind::CloseParenToken),
            b';' => self.single(SyntaxKind::SemicolonToken),
            b',' => self.single(SyntaxKind::CommaToken),
            b':' => self.single(SyntaxKind::ColonToken),
            b'+' => self.single(SyntaxKind::PlusToken),
            b'-' => self.single(SyntaxKind::MinusToken),
            b'*' => self.single(SyntaxKind::AsteriskToken),
            b'/' => self.single(SyntaxKind::SlashToken),
            b'%' => self.single(SyntaxKind::PercentToken),
            b'<' => self.single(SyntaxKind::LessThanToken),
            b'>' => self.single(SyntaxKind::GreaterThanToken),
            b'=' => {
                self.pos += 1;
                if self.source.as_bytes().get(self.pos) == Some(&b'=') {
                    self.pos += 1;
                    SyntaxKind::EqualsEqualsToken
                } else {
                    SyntaxKind::EqualsToken
                }
            }
            b'0'..=b'9' => {
                self.scan_digits(10);
                SyntaxKind::IntegerLiteral
            }
            _ => {
                let ch = self.current_char();
                if is_identifier_start(ch) {
                    return self.scan_identifier_or_keyword();
                }
                self.pos += ch.len_utf8();
                SyntaxKind::Unknown
            }
        };

        Ok(self.make_element(kind))
    }

    /// Run `callback` with the scanner advanced, then fully restore the
    /// pre-call state. Peek-without-commit.
    pub fn look_ahead<T>(&mut self, callback: impl FnOnce(&mut Scanner<'a>) -> T) -> T {
        self.save();
        let result = callback(self);
        self.restore();
        result
    }

    /// Run `callback`; keep the advance iff it returns `Ok(Some(_))`.
    ///
    /// A lexical error inside the speculation also restores before
    /// propagating, so a failed speculation never leaves half-consumed
    /// state behind.
    pub fn try_scan<T>(
        &mut self,
        callback: impl FnOnce(&mut Scanner<'a>) -> Result<Option<T>, LexError>,
    ) -> Result<Option<T>, LexError> {
        self.save();
        match callback(self) {
            Ok(Some(value)) => {
                self.commit();
                Ok(Some(value))
            }
            Ok(None) => {
                self.restore();
                Ok(None)
            }
            Err(e) => {
                self.restore();
                Err(e)
            }
        }
    }

    fn save(&mut self) {
        self.saved.push(ScannerState {
            pos: self.pos,
            token_start: self.token_start,
            line: self.line,
            line_start: self.line_start,
        });
    }

    fn restore(&mut self) {
        let state = self.saved.pop().expect("restore without matching save");
        self.pos = state.pos;
        self.token_start = state.token_start;
        self.line = state.line;
        self.line_start = state.line_start;
    }

    fn commit(&mut self) {
        self.saved.pop().expect("commit without matching save");
    }

    fn single(&mut self, kind: SyntaxKind) -> SyntaxKind {
        self.pos += 1;
        kind
    }

    fn current_char(&self) -> char {
        // pos always sits on a char boundary and below len here.
        self.source[self.pos..]
            .chars()
            .next()
            .expect("current_char past end of source")
    }

    /// Consume the maximal run of digits valid in `radix`.
    ///
    /// The acceptance sets fall through each other (binary ⊂ octal ⊂
    /// decimal ⊂ hex); only decimal is entered today, the radix parameter
    /// is for the `0b`/`0o`/`0x` prefixes of a future literal grammar.
    fn scan_digits(&mut self, radix: u32) {
        while let Some(c) = self.source[self.pos..].chars().next() {
            if c.is_digit(radix) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }
    }

    fn scan_identifier_or_keyword(&mut self) -> Result<SemanticElement, LexError> {
        while let Some(c) = self.source[self.pos..].chars().next() {
            if is_identifier_part(c) {
                self.pos += c.len_utf8();
            } else {
                break;
            }
        }

        let text = &self.source[self.token_start..self.pos];
        let first = text.chars().next().unwrap_or('\0');
        if first.is_ascii_lowercase() {
            if let Some(keyword) = SyntaxKind::keyword_from_text(text) {
                return Ok(self.make_element(keyword));
            }
            if is_future_reserved_word(text) {
                return Err(LexError::reserved_word(
                    self.make_element(SyntaxKind::Identifier),
                ));
            }
        }
        Ok(self.make_element(SyntaxKind::Identifier))
    }

    fn make_element(&self, kind: SyntaxKind) -> SemanticElement {
        let raw_text = self.source[self.token_start..self.pos].to_string();
        let value = match kind {
            SyntaxKind::IntegerLiteral => Some(raw_text.clone()),
            _ => None,
        };
        SemanticElement {
            kind,
            line: self.line,
            column: (self.token_start - self.line_start + 1) as u32,
            pos: self.token_start,
            length: self.pos - self.token_start,
            raw_text,
            value,
        }
    }
}

/// Identifier starts: ASCII letters, `_`, `$`, and any code point above
/// U+007F in any position.
fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$' || (c as u32) > 0x7F
}

fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

/// A scanner error with the offending element and a friendly message.
#[derive(Debug, Clone)]
pub struct LexError {
    pub element: SemanticElement,
    pub message: String,
    pub hint: Option<String>,
}

impl std::fmt::Display for LexError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for LexError {}

impl LexError {
    fn carriage_return(element: SemanticElement) -> Self {
        Self {
            element,
            message: "FATAL: Windows encountered".to_string(),
            hint: Some("line breaks must be a bare line feed (0x0A)".to_string()),
        }
    }

    fn reserved_word(element: SemanticElement) -> Self {
        let message = format!("\"{}\" is a reserved keyword", element.raw_text);
        Self {
            element,
            message,
            hint: Some("this word is reserved for a future language version; rename it".to_string()),
        }
    }
}
