//! Suffix array builder
//!
//! Builds a suffix array from a sequence of records by:
//! 1. Concatenating all records, each terminated by the record delimiter
//! 2. Sorting all suffixes by prefix doubling, in parallel for large inputs
//!
//! The result is directly searchable, and can be persisted with
//! [`SuffixArrayWriter`](super::writer::SuffixArrayWriter).

use super::access::SuffixArrayAccess;
use super::types::*;
use crate::regex::ast::RegEx;
use crate::regex::executor::SuccinctIndex;
use crate::regex::matches::RangeMatch;
use crate::regex::resolver::SuffixArrayResolver;
use anyhow::Result;
use memchr::memchr_iter;
use rayon::prelude::*;
use tracing::info;

/// Builder for constructing suffix arrays from records
pub struct SuffixArrayBuilder {
    config: IndexConfig,
    /// Concatenated text (case-folded if configured)
    text: Vec<u8>,
    /// Start offset of each record in the text
    record_starts: Vec<TextPosition>,
    /// Count of excluded records
    excluded_count: u32,
}

impl SuffixArrayBuilder {
    /// Create a new suffix array builder with the given configuration
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            text: Vec::new(),
            record_starts: Vec::new(),
            excluded_count: 0,
        }
    }

    /// Create a builder with default configuration
    pub fn with_defaults() -> Self {
        Self::new(IndexConfig::default())
    }

    /// Add a single record
    ///
    /// Returns `true` if the record was added, `false` if it was skipped
    /// (contains the delimiter, or would exceed the size limit)
    pub fn add_record(&mut self, content: &[u8]) -> bool {
        let delim = self.config.record_delim;

        if content.contains(&delim) {
            self.excluded_count += 1;
            return false;
        }

        // Record plus its terminator
        if (self.text.len() + content.len() + 1) as u64 > self.config.max_input_size {
            self.excluded_count += 1;
            return false;
        }

        self.record_starts.push(self.text.len() as TextPosition);

        if self.config.case_insensitive {
            self.text
                .extend(content.iter().map(|&b| b.to_ascii_lowercase()));
        } else {
            self.text.extend_from_slice(content);
        }
        self.text.push(delim);

        true
    }

    /// Split `data` on the record delimiter and add every record
    ///
    /// A missing delimiter after the last record is tolerated. Returns the
    /// number of records added.
    pub fn add_text(&mut self, data: &[u8]) -> usize {
        let mut added = 0;
        let mut start = 0;

        for pos in memchr_iter(self.config.record_delim, data) {
            if self.add_record(&data[start..pos]) {
                added += 1;
            }
            start = pos + 1;
        }
        if start < data.len() && self.add_record(&data[start..]) {
            added += 1;
        }

        added
    }

    /// Build the suffix array from accumulated records
    ///
    /// This is the main computation - sorts all suffixes in parallel
    pub fn build(self) -> BuiltSuffixArray {
        let text = self.text;
        let suffix_array = build_suffix_array_parallel(&text);

        info!(
            text_size = text.len(),
            records = self.record_starts.len(),
            excluded = self.excluded_count,
            "built suffix array"
        );

        BuiltSuffixArray {
            text,
            suffix_array,
            record_starts: self.record_starts,
            config: self.config,
            excluded_count: self.excluded_count,
        }
    }

    /// Get the current size of accumulated text
    pub fn text_size(&self) -> usize {
        self.text.len()
    }

    /// Get the number of records added
    pub fn record_count(&self) -> usize {
        self.record_starts.len()
    }
}

/// Result of building a suffix array
#[derive(Debug)]
pub struct BuiltSuffixArray {
    /// Concatenated record text (case-folded if configured)
    pub text: Vec<u8>,
    /// Sorted suffix array (positions into text)
    pub suffix_array: Vec<SuffixEntry>,
    /// Start offset of each record
    pub record_starts: Vec<TextPosition>,
    /// Configuration used for building
    pub config: IndexConfig,
    /// Number of records excluded
    pub excluded_count: u32,
}

impl BuiltSuffixArray {
    /// Get metadata about this suffix array
    pub fn meta(&self) -> IndexMeta {
        IndexMeta {
            version: SA_VERSION,
            text_size: self.text.len() as u64,
            suffix_count: self.suffix_array.len() as u64,
            record_count: self.record_starts.len() as u32,
            excluded_count: self.excluded_count,
            config: self.config.clone(),
        }
    }
}

impl SuffixArrayAccess for BuiltSuffixArray {
    fn suffix_count(&self) -> u64 {
        self.suffix_array.len() as u64
    }

    #[inline]
    fn suffix_at(&self, i: u64) -> TextPosition {
        self.suffix_array[i as usize]
    }

    fn text(&self) -> &[u8] {
        &self.text
    }

    fn record_starts(&self) -> &[TextPosition] {
        &self.record_starts
    }

    fn config(&self) -> &IndexConfig {
        &self.config
    }
}

impl SuccinctIndex for BuiltSuffixArray {
    fn index_to_offset(&self, position: u64) -> u64 {
        self.suffix_at(position)
    }

    fn resolve_primitive(&self, node: &RegEx) -> Result<Vec<RangeMatch>> {
        SuffixArrayResolver::new(self).resolve(node)
    }
}

/// Build suffix array by prefix doubling
///
/// Each round sorts positions by the rank pair of their first `k` and next
/// `k` bytes, then re-ranks, doubling `k` until every rank is distinct.
/// The result is the full suffix order: regex evaluation narrows ranges to
/// arbitrary depths, so ordering must hold past any fixed prefix length.
/// Rounds are logarithmic in the longest repeat, so highly repetitive
/// text does not degrade to quadratic comparisons.
fn build_suffix_array_parallel(text: &[u8]) -> Vec<SuffixEntry> {
    let n = text.len();

    let mut sa: Vec<SuffixEntry> = (0..n as SuffixEntry).collect();
    if n == 0 {
        return sa;
    }

    let mut rank: Vec<u64> = text.iter().map(|&b| b as u64).collect();
    let mut next_rank = vec![0u64; n];
    let mut k = 1;

    loop {
        // Past the end of the text ranks below every byte
        let key = |i: SuffixEntry| {
            let i = i as usize;
            (rank[i], if i + k < n { rank[i + k] + 1 } else { 0 })
        };

        if n > 100_000 {
            sa.par_sort_unstable_by_key(|&i| key(i));
        } else {
            sa.sort_unstable_by_key(|&i| key(i));
        }

        next_rank[sa[0] as usize] = 0;
        for w in 1..n {
            let bump = u64::from(key(sa[w - 1]) != key(sa[w]));
            next_rank[sa[w] as usize] = next_rank[sa[w - 1] as usize] + bump;
        }
        std::mem::swap(&mut rank, &mut next_rank);

        if rank[sa[n - 1] as usize] == n as u64 - 1 || k >= n {
            break;
        }
        k *= 2;
    }

    sa
}
