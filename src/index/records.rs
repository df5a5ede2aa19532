//! Record-oriented queries
//!
//! Records are the delimiter-terminated slices of the indexed text. Every
//! index that can both search suffixes and evaluate regexes gets these
//! operations through the blanket [`RecordSearch`] impl.

use super::access::SuffixArrayAccess;
use super::types::{RecordId, TextPosition};
use crate::regex::executor::{ExecutorConfig, MatchMode, RegExExecutor, SuccinctIndex};
use crate::regex::matches::MatchSet;
use crate::regex::parser::parse_regex;
use anyhow::Result;
use roaring::RoaringBitmap;

pub trait RecordSearch: SuffixArrayAccess + SuccinctIndex + Sync {
    /// Byte terminating every record
    fn record_delim(&self) -> u8 {
        self.config().record_delim
    }

    /// Number of records in the index
    fn num_records(&self) -> usize {
        self.record_starts().len()
    }

    /// Record containing text offset `offset`
    fn record_of(&self, offset: TextPosition) -> Option<RecordId> {
        if offset >= self.text().len() as u64 {
            return None;
        }
        let idx = self.record_starts().partition_point(|&start| start <= offset);
        idx.checked_sub(1).map(|id| id as RecordId)
    }

    /// Text span of a record, excluding its delimiter
    fn record_span(&self, id: RecordId) -> Option<(TextPosition, TextPosition)> {
        let starts = self.record_starts();
        let start = *starts.get(id as usize)?;
        let next = starts
            .get(id as usize + 1)
            .copied()
            .unwrap_or(self.text().len() as u64);
        Some((start, next.saturating_sub(1).max(start)))
    }

    /// Bytes of a record, excluding its delimiter
    fn record_bytes(&self, id: RecordId) -> Option<&[u8]> {
        let (start, end) = self.record_span(id)?;
        self.text().get(start as usize..end as usize)
    }

    /// Ids of the records containing `query`, ascending
    fn record_ids(&self, query: &[u8]) -> RoaringBitmap {
        self.search_offsets(query)
            .into_iter()
            .filter_map(|offset| self.record_of(offset))
            .collect()
    }

    /// Start offsets of the records containing `query`, ascending
    fn record_search_offsets(&self, query: &[u8]) -> Vec<TextPosition> {
        let starts = self.record_starts();
        self.record_ids(query)
            .iter()
            .map(|id| starts[id as usize])
            .collect()
    }

    /// Records containing `query`, in record order
    fn record_search(&self, query: &[u8]) -> Vec<Vec<u8>> {
        self.record_ids(query)
            .iter()
            .filter_map(|id| self.record_bytes(id).map(<[u8]>::to_vec))
            .collect()
    }

    /// Number of occurrences of `query` in the text
    fn record_count(&self, query: &[u8]) -> u64 {
        self.count(query)
    }

    /// `count` records starting at record `first`
    fn extract_records(&self, first: RecordId, count: usize) -> Vec<Vec<u8>> {
        (first as usize..self.num_records())
            .take(count)
            .filter_map(|id| self.record_bytes(id as RecordId).map(<[u8]>::to_vec))
            .collect()
    }

    /// Up to `len` bytes of text starting at `offset`
    fn extract(&self, offset: TextPosition, len: usize) -> &[u8] {
        let text = self.text();
        let start = (offset as usize).min(text.len());
        let end = start.saturating_add(len).min(text.len());
        &text[start..end]
    }

    /// Text from `offset` up to, not including, the next `delim`
    fn extract_until(&self, offset: TextPosition, delim: u8) -> &[u8] {
        let rest = self.extract(offset, usize::MAX);
        match memchr::memchr(delim, rest) {
            Some(end) => &rest[..end],
            None => rest,
        }
    }

    /// Every match of `pattern` in the text
    fn regex_search(&self, pattern: &str, config: &ExecutorConfig) -> Result<MatchSet> {
        let regex = parse_regex(pattern)?;
        RegExExecutor::new(self, config.clone()).evaluate(&regex)
    }

    /// Records containing a match of `pattern` that stays within the record
    ///
    /// Membership does not depend on `config.mode`: every match is
    /// considered, since greedy pruning could hide a match inside one
    /// record behind a longer one crossing into the next.
    fn record_search_regex(&self, pattern: &str, config: &ExecutorConfig) -> Result<Vec<Vec<u8>>> {
        let config = ExecutorConfig {
            mode: MatchMode::NonGreedy,
            ..config.clone()
        };
        let matches = self.regex_search(pattern, &config)?;

        let mut ids = RoaringBitmap::new();
        for m in &matches {
            let Some(id) = self.record_of(m.offset) else {
                continue;
            };
            let within = self.record_span(id).is_some_and(|(_, end)| m.end() <= end);
            if within {
                ids.insert(id);
            }
        }

        Ok(ids
            .iter()
            .filter_map(|id| self.record_bytes(id).map(<[u8]>::to_vec))
            .collect())
    }
}

impl<T: SuffixArrayAccess + SuccinctIndex + Sync + ?Sized> RecordSearch for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::builder::{BuiltSuffixArray, SuffixArrayBuilder};
    use crate::index::types::IndexConfig;

    fn sample() -> BuiltSuffixArray {
        let mut builder = SuffixArrayBuilder::with_defaults();
        builder.add_text(b"int main\nreturn 0\nprint(x)\nint y = 1\n");
        builder.build()
    }

    fn strings(records: Vec<Vec<u8>>) -> Vec<String> {
        records
            .into_iter()
            .map(|r| String::from_utf8(r).unwrap())
            .collect()
    }

    #[test]
    fn test_record_of() {
        let sa = sample();
        assert_eq!(sa.record_delim(), b'\n');
        assert_eq!(sa.num_records(), 4);
        assert_eq!(sa.record_of(0), Some(0));
        assert_eq!(sa.record_of(8), Some(0)); // delimiter belongs to its record
        assert_eq!(sa.record_of(9), Some(1));
        assert_eq!(sa.record_of(sa.text().len() as u64), None);
    }

    #[test]
    fn test_record_search() {
        let sa = sample();
        assert_eq!(sa.record_search_offsets(b"int"), vec![0, 18, 27]);
        assert_eq!(
            strings(sa.record_search(b"int")),
            vec!["int main", "print(x)", "int y = 1"]
        );
        assert!(sa.record_search(b"missing").is_empty());
    }

    #[test]
    fn test_record_count_counts_occurrences() {
        let mut builder = SuffixArrayBuilder::with_defaults();
        builder.add_record(b"int int");
        builder.add_record(b"int");
        let sa = builder.build();
        assert_eq!(sa.record_count(b"int"), 3);
        assert_eq!(sa.record_search(b"int").len(), 2);
    }

    #[test]
    fn test_extract_records() {
        let sa = sample();
        assert_eq!(
            strings(sa.extract_records(1, 2)),
            vec!["return 0", "print(x)"]
        );
        assert_eq!(strings(sa.extract_records(3, 10)), vec!["int y = 1"]);
        assert!(sa.extract_records(9, 1).is_empty());
    }

    #[test]
    fn test_extract() {
        let sa = sample();
        assert_eq!(sa.extract(4, 4), b"main");
        assert_eq!(sa.extract_until(9, b'\n'), b"return 0");
        assert_eq!(sa.extract_until(9, b' '), b"return");
        assert!(sa.extract(1000, 5).is_empty());
    }

    #[test]
    fn test_empty_record() {
        let mut builder = SuffixArrayBuilder::with_defaults();
        builder.add_record(b"");
        builder.add_record(b"a");
        let sa = builder.build();
        assert_eq!(sa.record_bytes(0), Some(&b""[..]));
        assert_eq!(sa.record_bytes(1), Some(&b"a"[..]));
    }

    #[test]
    fn test_record_search_regex() {
        let sa = sample();
        let config = ExecutorConfig::default();
        assert_eq!(
            strings(sa.record_search_regex("int [a-z]", &config).unwrap()),
            vec!["int main", "int y = 1"]
        );
        assert_eq!(
            strings(sa.record_search_regex("r.*0", &config).unwrap()),
            vec!["return 0"]
        );
    }

    #[test]
    fn test_record_search_regex_drops_cross_record_matches() {
        let sa = sample();
        // "main" and "return" are only joined across a delimiter
        let config = ExecutorConfig {
            mode: MatchMode::NonGreedy,
            ..Default::default()
        };
        assert!(!sa.regex_search("main.*return", &config).unwrap().is_empty());
        assert!(sa.record_search_regex("main.*return", &config).unwrap().is_empty());
    }

    #[test]
    fn test_record_search_regex_ignores_greedy_pruning() {
        let mut builder = SuffixArrayBuilder::with_defaults();
        builder.add_text(b"a\nb\n");
        let sa = builder.build();
        let greedy = ExecutorConfig::default();

        // Greedy keeps only "a\nb", which crosses into the next record
        let matches = sa.regex_search("a\\nb|a", &greedy).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(strings(sa.record_search_regex("a\\nb|a", &greedy).unwrap()), vec!["a"]);
    }

    #[test]
    fn test_record_search_regex_union_over_wildcard() {
        let mut builder = SuffixArrayBuilder::with_defaults();
        builder.add_text(b"a\nc\nb\n");
        let sa = builder.build();

        for mode in [MatchMode::Greedy, MatchMode::NonGreedy] {
            let config = ExecutorConfig {
                mode,
                ..Default::default()
            };
            assert_eq!(strings(sa.record_search_regex("a.*b|c", &config).unwrap()), vec!["c"]);
        }
    }

    #[test]
    fn test_case_insensitive_records() {
        let mut builder = SuffixArrayBuilder::new(IndexConfig {
            case_insensitive: true,
            ..Default::default()
        });
        builder.add_text(b"Hello\nWORLD\n");
        let sa = builder.build();
        assert_eq!(sa.record_search_offsets(b"WORLD"), vec![6]);
        assert_eq!(sa.record_count(b"hello"), 1);
    }
}
