//! Integration tests checking index regex search against a brute-force
//! enumeration with the `regex` crate.
//!
//! For every pattern, the oracle tries each non-empty substring of the
//! indexed text against `^(?:oracle)$`. Oracle patterns differ from the
//! indexed ones only where the two dialects differ: a `.*` gap may cross
//! records, so it becomes `(?s:.*)`, and negated classes spell out the
//! delimiter they exclude.

use regex::bytes::Regex;
use sarex::index::{
    BuiltSuffixArray, IndexConfig, RecordSearch, SuffixArrayAccess, SuffixArrayBuilder,
    SuffixArrayReader, SuffixArrayWriter,
};
use sarex::regex::{ExecutorConfig, MatchMode, MatchSet, SortOrder};
use std::collections::BTreeSet;
use tempfile::tempdir;

const RECORDS: &[&str] = &[
    "int main() {",
    "  int x = 42;",
    "  return x;",
    "}",
    "print(int)",
    "aaa bab abba",
];

/// Patterns without a gap, with their oracle spelling
const PLAIN: &[(&str, &str)] = &[
    ("int", "int"),
    ("in[a-z]", "in[a-z]"),
    ("a+", "a+"),
    ("ab*a", "ab*a"),
    ("[0-9]+", "[0-9]+"),
    ("x.?", "x.?"),
    ("(re|pr)[a-z]+", "(re|pr)[a-z]+"),
    ("a{1,2}b", "a{1,2}b"),
    ("\\d\\d", "\\d\\d"),
    ("[^ ]+t", "[^ \\n]+t"),
    ("i.t", "i.t"),
    ("(ab|b)+a?", "(ab|b)+a?"),
    ("\\(int\\)", "\\(int\\)"),
];

/// Patterns with a `.*` gap, with their oracle spelling
const GAPPED: &[(&str, &str)] = &[
    ("int.*;", "int(?s:.*);"),
    ("m.*x", "m(?s:.*)x"),
    ("(a|b).*b", "(a|b)(?s:.*)b"),
    ("[0-9].*r.*a", "[0-9](?s:.*)r(?s:.*)a"),
    ("t.*t", "t(?s:.*)t"),
];

fn text() -> Vec<u8> {
    let mut text = RECORDS.join("\n").into_bytes();
    text.push(b'\n');
    text
}

fn build(config: IndexConfig) -> BuiltSuffixArray {
    let mut builder = SuffixArrayBuilder::new(config);
    builder.add_text(&text());
    builder.build()
}

fn config(mode: MatchMode) -> ExecutorConfig {
    ExecutorConfig {
        mode,
        ..Default::default()
    }
}

/// Every non-empty substring of `text` fully matching `oracle`
fn brute_force(text: &[u8], oracle: &str) -> BTreeSet<(u64, u64)> {
    let re = Regex::new(&format!("(?-u)^(?:{})$", oracle)).unwrap();
    let mut out = BTreeSet::new();
    for start in 0..text.len() {
        for end in start + 1..=text.len() {
            if re.is_match(&text[start..end]) {
                out.insert((start as u64, (end - start) as u64));
            }
        }
    }
    out
}

/// Longest match per offset, then drop matches contained in another
fn greedy(all: &BTreeSet<(u64, u64)>) -> BTreeSet<(u64, u64)> {
    let mut longest: Vec<(u64, u64)> = Vec::new();
    for &(offset, length) in all {
        match longest.last_mut() {
            Some(last) if last.0 == offset => last.1 = last.1.max(length),
            _ => longest.push((offset, length)),
        }
    }

    let mut kept = BTreeSet::new();
    let mut furthest = 0;
    for (offset, length) in longest {
        if offset + length > furthest {
            furthest = offset + length;
            kept.insert((offset, length));
        }
    }
    kept
}

fn as_set(matches: &MatchSet) -> BTreeSet<(u64, u64)> {
    matches.iter().map(|m| (m.offset, m.length)).collect()
}

fn assert_front_sorted(matches: &MatchSet) {
    assert_eq!(matches.order(), SortOrder::FrontSorted);
    for pair in matches.as_slice().windows(2) {
        let (a, b) = (pair[0], pair[1]);
        assert!(
            a.offset < b.offset || (a.offset == b.offset && a.length > b.length),
            "{a} before {b}"
        );
    }
}

#[test]
fn test_non_greedy_matches_brute_force() {
    let sa = build(IndexConfig::default());
    let text = text();

    for &(pattern, oracle) in PLAIN.iter().chain(GAPPED) {
        let matches = sa.regex_search(pattern, &config(MatchMode::NonGreedy)).unwrap();
        assert_front_sorted(&matches);
        assert_eq!(
            as_set(&matches),
            brute_force(&text, oracle),
            "pattern {pattern}"
        );
    }
}

#[test]
fn test_greedy_matches_brute_force() {
    let sa = build(IndexConfig::default());
    let text = text();

    for &(pattern, oracle) in PLAIN {
        let matches = sa.regex_search(pattern, &config(MatchMode::Greedy)).unwrap();
        assert_front_sorted(&matches);
        assert_eq!(
            as_set(&matches),
            greedy(&brute_force(&text, oracle)),
            "pattern {pattern}"
        );
    }
}

#[test]
fn test_greedy_is_containment_free() {
    let sa = build(IndexConfig::default());
    for &(pattern, _) in PLAIN {
        let matches = sa.regex_search(pattern, &config(MatchMode::Greedy)).unwrap();
        let kept = matches.as_slice();
        for a in kept {
            for b in kept {
                assert!(a == b || !a.contains(b), "{pattern}: {a} contains {b}");
            }
        }
    }
}

#[test]
fn test_greedy_keeps_every_joined_pair() {
    let sa = build(IndexConfig::default());
    let text = text();

    // Every gap side here has a fixed length, so pruning leaves each side
    // whole and the join reports every valid pair
    for &(pattern, oracle) in GAPPED {
        let matches = sa.regex_search(pattern, &config(MatchMode::Greedy)).unwrap();
        assert_front_sorted(&matches);
        assert_eq!(
            as_set(&matches),
            brute_force(&text, oracle),
            "pattern {pattern}"
        );
    }

    let spans = sa.regex_search("t.*t", &config(MatchMode::Greedy)).unwrap();
    let nested = spans
        .iter()
        .any(|a| spans.iter().any(|b| a != b && a.contains(b)));
    assert!(nested);
}

#[test]
fn test_greedy_union_with_unmatched_branch() {
    let mut builder = SuffixArrayBuilder::with_defaults();
    builder.add_text(b"ab ab x\n");
    let sa = builder.build();
    let greedy = config(MatchMode::Greedy);

    let gapped = sa.regex_search("ab.*x", &greedy).unwrap();
    assert_eq!(as_set(&gapped), BTreeSet::from([(0, 7), (3, 4)]));
    assert_eq!(sa.regex_search("ab.*x|zzz", &greedy).unwrap(), gapped);
    assert_eq!(sa.regex_search("zzz|ab.*x", &greedy).unwrap(), gapped);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let sa = build(IndexConfig::default());
    for &(pattern, _) in GAPPED {
        for mode in [MatchMode::Greedy, MatchMode::NonGreedy] {
            let sequential = sa.regex_search(pattern, &config(mode)).unwrap();
            let parallel = sa
                .regex_search(
                    pattern,
                    &ExecutorConfig {
                        parallel: true,
                        ..config(mode)
                    },
                )
                .unwrap();
            assert_eq!(sequential, parallel, "pattern {pattern}");
        }
    }
}

#[test]
fn test_persisted_index_gives_same_results() {
    let temp_dir = tempdir().unwrap();
    let index_path = temp_dir.path().join("idx");

    let built = build(IndexConfig::default());
    SuffixArrayWriter::write(&index_path, &built).unwrap();
    let reader = SuffixArrayReader::open(&index_path).unwrap();

    assert_eq!(reader.text(), built.text());
    for &(pattern, _) in PLAIN.iter().chain(GAPPED) {
        for mode in [MatchMode::Greedy, MatchMode::NonGreedy] {
            assert_eq!(
                reader.regex_search(pattern, &config(mode)).unwrap(),
                built.regex_search(pattern, &config(mode)).unwrap(),
                "pattern {pattern}"
            );
        }
    }
}

#[test]
fn test_case_insensitive_index() {
    let sa = build(IndexConfig {
        case_insensitive: true,
        ..Default::default()
    });
    let text = text();

    for (pattern, oracle) in [("INT [a-z]", "(?i)INT [a-z]"), ("Print.*X", "(?i)Print(?s:.*)X")] {
        let matches = sa.regex_search(pattern, &config(MatchMode::NonGreedy)).unwrap();
        assert_eq!(as_set(&matches), brute_force(&text, oracle), "pattern {pattern}");
    }
}

#[test]
fn test_record_layer() {
    let sa = build(IndexConfig::default());
    let text = text();

    let occurrences = text.windows(3).filter(|w| *w == b"int").count() as u64;
    assert_eq!(sa.record_count(b"int"), occurrences);
    assert_eq!(occurrences, 4);

    let records: Vec<String> = sa
        .record_search(b"int")
        .into_iter()
        .map(|r| String::from_utf8(r).unwrap())
        .collect();
    assert_eq!(records, vec!["int main() {", "  int x = 42;", "print(int)"]);

    let extracted: Vec<Vec<u8>> = sa.extract_records(0, RECORDS.len());
    let expected: Vec<Vec<u8>> = RECORDS.iter().map(|r| r.as_bytes().to_vec()).collect();
    assert_eq!(extracted, expected);
}

#[test]
fn test_record_search_regex_stays_within_records() {
    let sa = build(IndexConfig::default());
    let found: Vec<String> = sa
        .record_search_regex("int.*;", &config(MatchMode::Greedy))
        .unwrap()
        .into_iter()
        .map(|r| String::from_utf8(r).unwrap())
        .collect();
    // "int main() {" reaches a ';' only in a later record
    assert_eq!(found, vec!["  int x = 42;"]);
}

#[test]
fn test_record_search_regex_same_in_both_modes() {
    let mut builder = SuffixArrayBuilder::with_defaults();
    builder.add_text(b"a\nc\nb\n");
    let sa = builder.build();

    // Greedy keeps "a\nc" at offset 0, which crosses a delimiter, and
    // drops the "a" that fits in the first record
    let greedy = sa.regex_search("a\\nc|a", &config(MatchMode::Greedy)).unwrap();
    assert_eq!(as_set(&greedy), BTreeSet::from([(0, 3)]));

    for mode in [MatchMode::Greedy, MatchMode::NonGreedy] {
        let found = sa.record_search_regex("a\\nc|a", &config(mode)).unwrap();
        assert_eq!(found, vec![b"a".to_vec()], "{mode:?}");

        for pattern in ["a.*b|c", "(a.*b|c)", "c|a.*b"] {
            let found = sa.record_search_regex(pattern, &config(mode)).unwrap();
            assert_eq!(found, vec![b"c".to_vec()], "pattern {pattern} {mode:?}");
        }
    }
}

#[test]
fn test_invalid_patterns_are_errors() {
    let sa = build(IndexConfig::default());
    for pattern in ["(ab", "a{3,1}", "[z-a]", ".*", "*a", "(.*|b)c"] {
        assert!(
            sa.regex_search(pattern, &ExecutorConfig::default()).is_err(),
            "pattern {pattern}"
        );
    }
}
