// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Terminal formatter for diagnostics.
//!
//! Produces color-coded output in the familiar compiler shape:
//!
//! ```text
//! error[E0100]: Expected ';', found 'let'
//!   --> demo.uh:2:1
//!    |
//!  2 | let y = 2;
//!    | ^^^ here
//!    |
//!    = help: statements end with ';'
//! ```

use colored::Colorize;

use unholy_ast::LineMap;

use crate::{Diagnostic, LabelStyle, Severity};

/// Formats diagnostics against their source text.
pub struct DiagnosticFormatter<'a> {
    source: &'a str,
    file_name: Option<&'a str>,
    line_map: LineMap,
}

impl<'a> DiagnosticFormatter<'a> {
    pub fn new(source: &'a str) -> Self {
        let line_map = LineMap::new(source);
        Self {
            source,
            file_name: None,
            line_map,
        }
    }

    pub fn with_file_name(mut self, name: &'a str) -> Self {
        self.file_name = Some(name);
        self
    }

    pub fn format(&self, diagnostic: &Diagnostic) -> String {
        let mut out = String::new();
        self.format_header(&mut out, diagnostic);

        // The primary label anchors the pointer line; secondary labels
        // follow in declaration order.
        let primary = diagnostic
            .labels
            .iter()
            .find(|l| l.style == LabelStyle::Primary)
            .or(diagnostic.labels.first());

        if let Some(anchor) = primary {
            let (line, col) = self.line_map.line_col(anchor.span.start);
            let file = self.file_name.unwrap_or("<source>");
            out.push_str(&format!("  {} {}:{}:{}\n", "-->".blue(), file, line, col));

            for label in &diagnostic.labels {
                self.format_label(&mut out, label);
            }
        }

        self.format_footer(&mut out, diagnostic);
        out
    }

    fn format_header(&self, out: &mut String, diagnostic: &Diagnostic) {
        let label = match diagnostic.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        match &diagnostic.code {
            Some(code) => out.push_str(&format!(
                "{}{}{}{}: {}\n",
                label,
                "[".red().bold(),
                code.0.red().bold(),
                "]".red().bold(),
                diagnostic.message.bold()
            )),
            None => out.push_str(&format!("{}: {}\n", label, diagnostic.message.bold())),
        }
    }

    fn format_label(&self, out: &mut String, label: &crate::Label) {
        let (line, col) = self.line_map.line_col(label.span.start);
        let Some(text) = self.line_map.line_text(self.source, line) else {
            return;
        };

        let gutter_width = line.to_string().len().max(2);
        let gutter = " ".repeat(gutter_width);
        let line_label = format!("{:>width$}", line, width = gutter_width);
        out.push_str(&format!("{} {}\n", gutter, "|".blue()));
        out.push_str(&format!("{} {} {}\n", line_label.blue(), "|".blue(), text));

        // A zero-width span (end of file) still gets one caret.
        let width = label.span.len().max(1);
        let underline = "^".repeat(width);
        let styled = match label.style {
            LabelStyle::Primary => underline.red().bold(),
            LabelStyle::Secondary => underline.yellow(),
        };
        let mut caret_line = format!(
            "{} {} {}{}",
            gutter,
            "|".blue(),
            " ".repeat(col as usize - 1),
            styled
        );
        if let Some(ref message) = label.message {
            caret_line.push(' ');
            caret_line.push_str(message);
        }
        caret_line.push('\n');
        out.push_str(&caret_line);
    }

    fn format_footer(&self, out: &mut String, diagnostic: &Diagnostic) {
        let gutter = " ".repeat(2);
        for note in &diagnostic.notes {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                gutter,
                "=".blue(),
                "note".bold(),
                note
            ));
        }
        if let Some(ref help) = diagnostic.help {
            out.push_str(&format!(
                "{} {} {}: {}\n",
                gutter,
                "=".blue(),
                "help".bold(),
                help.message
            ));
            if let Some(ref suggestion) = help.suggestion {
                out.push_str(&format!(
                    "{} {} {}: `{}`\n",
                    gutter,
                    "=".blue(),
                    "suggestion".bold(),
                    suggestion.replacement
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToDiagnostic;
    use unholy_ast::Span;

    fn plain_parse_error(source: &str) -> String {
        colored::control::set_override(false);
        let err = unholy_parser::parse_source("demo.uh", source).unwrap_err();
        let formatter = DiagnosticFormatter::new(source).with_file_name("demo.uh");
        let out = formatter.format(&err.to_diagnostic());
        colored::control::unset_override();
        out
    }

    #[test]
    fn renders_header_pointer_and_caret() {
        let out = plain_parse_error("let x: y = 1;");
        assert!(out.contains("error[E0100]:"), "got:\n{}", out);
        assert!(out.contains("--> demo.uh:1:8"));
        assert!(out.contains("let x: y = 1;"));
        assert!(out.contains("^ here"));
        assert!(out.contains("= help:"));
    }

    #[test]
    fn zero_width_span_still_points() {
        // EOF has no width; the caret must still render.
        let out = plain_parse_error("let x = 1");
        assert!(out.contains("^"), "got:\n{}", out);
    }

    #[test]
    fn secondary_labels_and_notes_render() {
        colored::control::set_override(false);
        let source = "let a = 1;\nlet a = 2;";
        let diag = Diagnostic::warning("shadowed binding")
            .with_primary(Span::new(15, 16), "redefined here")
            .with_secondary(Span::new(4, 5), "first defined here")
            .with_note("the first binding is never read");
        let out = DiagnosticFormatter::new(source)
            .with_file_name("demo.uh")
            .format(&diag);
        colored::control::unset_override();

        assert!(out.contains("warning: shadowed binding"), "got:\n{}", out);
        assert!(out.contains("--> demo.uh:2:5"));
        assert!(out.contains("^ redefined here"));
        assert!(out.contains("^ first defined here"));
        assert!(out.contains("= note: the first binding is never read"));
    }
}
