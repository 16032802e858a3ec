// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Conversions from front-end error types to `Diagnostic`.

use crate::{Diagnostic, ToDiagnostic};

impl ToDiagnostic for unholy_scanner::LexError {
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(&self.message)
            .with_code("E0001")
            .with_primary(self.element.span(), "here");

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }

        diag
    }
}

impl ToDiagnostic for unholy_parser::ParseError {
    fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error(&self.message)
            .with_code("E0100")
            .with_primary(self.element.span(), "here");

        if let Some(ref hint) = self.hint {
            diag = diag.with_help(hint.as_str());
        }

        diag
    }
}

impl ToDiagnostic for unholy_parser::SyntaxError {
    fn to_diagnostic(&self) -> Diagnostic {
        match self {
            unholy_parser::SyntaxError::Lex(e) => e.to_diagnostic(),
            unholy_parser::SyntaxError::Parse(e) => e.to_diagnostic(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LabelStyle;

    #[test]
    fn syntax_errors_carry_code_and_span() {
        let err = unholy_parser::parse_source("t.uh", "let while = 1;").unwrap_err();
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_ref().unwrap().0, "E0001");
        assert_eq!(diag.primary_span().unwrap().start, 4);
        assert_eq!(diag.labels[0].style, LabelStyle::Primary);
        assert!(diag.message.contains("reserved keyword"));

        let err = unholy_parser::parse_source("t.uh", "let x").unwrap_err();
        let diag = err.to_diagnostic();
        assert_eq!(diag.code.as_ref().unwrap().0, "E0100");
        assert!(diag.help.is_some());
    }
}
