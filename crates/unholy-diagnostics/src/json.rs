// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! JSON output for editor tooling.
//!
//! The driver emits this with `--json` so editors and scripts can consume
//! diagnostics without scraping the terminal rendering.

use serde::Serialize;

use crate::Diagnostic;

/// A diagnostic batch for one file.
#[derive(Debug, Serialize)]
pub struct DiagnosticBatch<'a> {
    pub file: &'a str,
    pub diagnostics: &'a [Diagnostic],
}

/// Serialize a batch of diagnostics for `file` as pretty-printed JSON.
pub fn to_json(file: &str, diagnostics: &[Diagnostic]) -> String {
    let batch = DiagnosticBatch { file, diagnostics };
    // Diagnostic contains only maps, strings, and integers; serialization
    // cannot fail on it.
    serde_json::to_string_pretty(&batch).unwrap_or_else(|_| "{}".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ToDiagnostic;

    #[test]
    fn batch_round_trips_through_serde() {
        let err = unholy_parser::parse_source("t.uh", "return;").unwrap_err();
        let out = to_json("t.uh", &[err.to_diagnostic()]);
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["file"], "t.uh");
        assert_eq!(value["diagnostics"][0]["severity"], "error");
        assert_eq!(value["diagnostics"][0]["code"], "E0100");
        assert!(value["diagnostics"][0]["message"]
            .as_str()
            .unwrap()
            .contains("not allowed in this context"));
        assert_eq!(value["diagnostics"][0]["labels"][0]["style"], "primary");
        assert_eq!(value["diagnostics"][0]["labels"][0]["span"]["start"], 0);
    }
}
