// SPDX-License-Identifier: (MIT OR Apache-2.0)
//! Source location tracking.

/// A byte span in the source code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

/// Maps byte offsets back to 1-based line/column pairs and line texts.
///
/// The scanner tracks positions forward as it goes; this is the reverse
/// direction, used by the diagnostics renderer to show the offending line.
/// Built once per source in O(n), then each lookup is O(log n).
#[derive(Debug, Clone)]
pub struct LineMap {
    /// Offset of each line's first byte; index 0 holds 0 for line 1.
    line_starts: Vec<usize>,
}

impl LineMap {
    pub fn new(source: &str) -> Self {
        let line_starts = std::iter::once(0)
            .chain(
                source
                    .bytes()
                    .enumerate()
                    .filter(|(_, b)| *b == b'\n')
                    .map(|(i, _)| i + 1),
            )
            .collect();
        LineMap { line_starts }
    }

    /// 1-based (line, column) of the byte at `offset`.
    pub fn line_col(&self, offset: usize) -> (u32, u32) {
        let idx = self.line_starts.partition_point(|&start| start <= offset) - 1;
        ((idx + 1) as u32, (offset - self.line_starts[idx] + 1) as u32)
    }

    /// Text of the 1-based `line`, without its trailing line feed.
    pub fn line_text<'a>(&self, source: &'a str, line: u32) -> Option<&'a str> {
        let idx = (line as usize).checked_sub(1)?;
        let start = *self.line_starts.get(idx)?;
        let end = match self.line_starts.get(idx + 1) {
            Some(&next) => next - 1, // drop the \n
            None => source.len(),
        };
        source.get(start..end)
    }

    pub fn line_count(&self) -> u32 {
        self.line_starts.len() as u32
    }
}
