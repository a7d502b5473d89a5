use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Byte-offset span into the source a node was parsed from.
///
/// Nodes created by the middle-end (parameter assignments, rewritten yields)
/// inherit the span of the node they were derived from, so every statement in
/// a transformed tree still points at real source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    pub fn new(start: u32, end: u32) -> Self {
        debug_assert!(start <= end, "span start ({start}) must be <= end ({end})");
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Smallest span covering both `self` and `other`.
    pub fn cover(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Convert to a `usize` range clamped to `len`, never empty unless `len` is 0.
    ///
    /// Diagnostic renderers need at least one character to underline.
    pub fn to_range(self, len: usize) -> Range<usize> {
        let start = (self.start as usize).min(len);
        let end = (self.end as usize).min(len).max(start);
        if start == end {
            start..(end + 1).min(len)
        } else {
            start..end
        }
    }
}

/// Line start offsets of one source text, for turning spans into line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_starts: Vec<u32>,
}

impl LineIndex {
    pub fn new(source: &str) -> Self {
        let mut line_starts = vec![0u32];
        line_starts.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        Self { line_starts }
    }

    /// 1-based line containing `offset`.
    pub fn line(&self, offset: u32) -> u32 {
        self.line_col(offset).0
    }

    /// 1-based (line, column) of `offset`; the column counts bytes.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let idx = self
            .line_starts
            .partition_point(|&start| start <= offset)
            .saturating_sub(1);
        (idx as u32 + 1, offset - self.line_starts[idx] + 1)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cover_spans_both() {
        let merged = Span::new(5, 10).cover(Span::new(8, 15));
        assert_eq!(merged, Span::new(5, 15));
        assert!(!merged.is_empty());
    }

    #[test]
    fn to_range_widens_empty_spans() {
        assert_eq!(Span::new(3, 3).to_range(10), 3..4);
        assert_eq!(Span::new(2, 6).to_range(10), 2..6);
        assert_eq!(Span::new(20, 30).to_range(10), 10..10);
    }

    #[test]
    fn line_lookup_across_newlines() {
        let idx = LineIndex::new("foreach x in range(3)\n  print x\n");
        assert_eq!(idx.line_col(0), (1, 1));
        assert_eq!(idx.line(21), 1);
        assert_eq!(idx.line(22), 2);
        assert_eq!(idx.line_col(24), (2, 3));
        assert_eq!(idx.line_count(), 3);
    }

    #[test]
    fn span_serializes_as_offsets() {
        let json = serde_json::to_string(&Span::new(1, 4)).unwrap();
        assert_eq!(json, r#"{"start":1,"end":4}"#);
        let back: Span = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Span::new(1, 4));
    }
}
