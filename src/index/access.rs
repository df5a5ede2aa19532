//! Range search over a sorted suffix array
//!
//! Both the in-memory [`BuiltSuffixArray`](super::builder::BuiltSuffixArray)
//! and the memory-mapped [`SuffixArrayReader`](super::reader::SuffixArrayReader)
//! expose their text and suffix entries through [`SuffixArrayAccess`]; the
//! binary searches below are written once against that trait.
//!
//! Every range handed out here is *uniform*: all suffixes in
//! `[begin, end]` share the same first `length` bytes.

use super::types::{IndexConfig, TextPosition};
use crate::regex::matches::RangeMatch;

pub trait SuffixArrayAccess {
    /// Number of suffixes (equals text length)
    fn suffix_count(&self) -> u64;

    /// Text position of the suffix at sorted index `i`
    fn suffix_at(&self, i: u64) -> TextPosition;

    /// The indexed text (case-folded if configured)
    fn text(&self) -> &[u8];

    /// Start offset of every record, ascending
    fn record_starts(&self) -> &[TextPosition];

    fn config(&self) -> &IndexConfig;

    /// Range covering every suffix, at depth zero
    fn full_range(&self) -> Option<RangeMatch> {
        let n = self.suffix_count();
        if n == 0 {
            None
        } else {
            Some(RangeMatch::new(0, n - 1, 0))
        }
    }

    /// Search for a pattern in the suffix array
    ///
    /// Returns the range [lo, hi) of indices in the suffix array
    /// where all suffixes start with the pattern.
    fn search(&self, pattern: &[u8]) -> (u64, u64) {
        if pattern.is_empty() {
            return (0, 0);
        }
        match self.full_range().and_then(|full| self.narrow(full, pattern)) {
            Some(range) => (range.begin, range.end + 1),
            None => (0, 0),
        }
    }

    /// Narrow a uniform range to the suffixes that continue with `bytes`
    /// right after the range's shared prefix.
    ///
    /// Returns `None` if no suffix in the range continues that way.
    fn narrow(&self, range: RangeMatch, bytes: &[u8]) -> Option<RangeMatch> {
        if range.empty() {
            return None;
        }

        let config = self.config();
        let folded: Vec<u8>;
        let bytes = if config.case_insensitive {
            folded = bytes.iter().map(|&b| config.fold(b)).collect();
            &folded
        } else {
            bytes
        };

        let depth = range.length as usize;
        let lo = self.lower_bound(range.begin, range.end + 1, depth, bytes);
        let hi = self.upper_bound(lo, range.end + 1, depth, bytes);

        if lo < hi {
            Some(RangeMatch::new(lo, hi - 1, range.length + bytes.len() as u64))
        } else {
            None
        }
    }

    /// Split a uniform range by the byte following its shared prefix.
    ///
    /// Suffixes that end exactly at the prefix are dropped. Each returned
    /// range is one byte deeper than `range`.
    fn byte_partitions(&self, range: RangeMatch) -> Vec<(u8, RangeMatch)> {
        let mut parts = Vec::new();
        if range.empty() {
            return parts;
        }

        let depth = range.length as usize;
        let stop = range.end + 1;
        let mut i = range.begin;

        while i < stop {
            let Some(byte) = self.byte_at(i, depth) else {
                // Only the shortest suffix can end here, and it sorts first
                i += 1;
                continue;
            };

            let hi = self.upper_bound(i, stop, depth, &[byte]);
            parts.push((byte, RangeMatch::new(i, hi - 1, range.length + 1)));
            i = hi;
        }

        parts
    }

    /// Byte at `depth` within the suffix at sorted index `i`
    #[inline]
    fn byte_at(&self, i: u64, depth: usize) -> Option<u8> {
        let pos = self.suffix_at(i) as usize + depth;
        self.text().get(pos).copied()
    }

    /// Suffix slice of up to `len` bytes starting `depth` bytes into the
    /// suffix at sorted index `i`
    #[inline]
    fn window(&self, i: u64, depth: usize, len: usize) -> &[u8] {
        let text = self.text();
        let start = (self.suffix_at(i) as usize + depth).min(text.len());
        let end = (start + len).min(text.len());
        &text[start..end]
    }

    /// First index in `[lo, hi)` whose window at `depth` is not less than
    /// `pattern`
    fn lower_bound(&self, mut lo: u64, mut hi: u64, depth: usize, pattern: &[u8]) -> u64 {
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.window(mid, depth, pattern.len()) < pattern {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// First index in `[lo, hi)` whose window at `depth` does not start
    /// with `pattern`
    fn upper_bound(&self, mut lo: u64, mut hi: u64, depth: usize, pattern: &[u8]) -> u64 {
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.window(mid, depth, pattern.len()) == pattern {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo
    }

    /// Number of occurrences of `pattern`
    fn count(&self, pattern: &[u8]) -> u64 {
        let (lo, hi) = self.search(pattern);
        hi - lo
    }

    /// Check if pattern exists in the suffix array
    fn contains(&self, pattern: &[u8]) -> bool {
        let (lo, hi) = self.search(pattern);
        lo < hi
    }

    /// Text offsets of every occurrence of `pattern`, ascending
    fn search_offsets(&self, pattern: &[u8]) -> Vec<TextPosition> {
        let (lo, hi) = self.search(pattern);
        let mut offsets: Vec<TextPosition> = (lo..hi).map(|i| self.suffix_at(i)).collect();
        offsets.sort_unstable();
        offsets
    }
}
