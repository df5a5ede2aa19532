//! Range-to-match conversion
//!
//! Turns raw suffix-array ranges into sorted location matches, either
//! keeping only the longest non-overlapping-by-containment matches
//! (greedy) or expanding every range position (non-greedy).

use super::executor::{MatchMode, SuccinctIndex};
use super::matches::{LocationMatch, MatchSet, RangeMatch, SortOrder};
use ahash::AHashMap;

/// Convert range results to location matches sorted by `order`
pub fn range_results_to_matches<I: SuccinctIndex + ?Sized>(
    index: &I,
    ranges: &[RangeMatch],
    mode: MatchMode,
    order: SortOrder,
) -> MatchSet {
    match mode {
        MatchMode::Greedy => greedy_matches(index, ranges).reorder(order),
        MatchMode::NonGreedy => {
            let mut matches = Vec::new();
            for range in ranges.iter().filter(|r| !r.empty()) {
                matches.extend(
                    index
                        .range_to_offsets(range)
                        .into_iter()
                        .map(|offset| LocationMatch::new(offset, range.length)),
                );
            }
            MatchSet::from_matches(order, matches)
        }
    }
}

/// Longest match per suffix-array position, with contained matches removed
fn greedy_matches<I: SuccinctIndex + ?Sized>(index: &I, ranges: &[RangeMatch]) -> MatchSet {
    let mut longest: AHashMap<u64, u64> = AHashMap::new();
    for range in ranges.iter().filter(|r| !r.empty()) {
        for position in range.begin..=range.end {
            longest
                .entry(position)
                .and_modify(|len| *len = (*len).max(range.length))
                .or_insert(range.length);
        }
    }

    let matches = longest
        .into_iter()
        .map(|(position, length)| LocationMatch::new(index.index_to_offset(position), length))
        .collect();

    prune_contained(MatchSet::from_matches(SortOrder::FrontSorted, matches))
}

/// Drop every match contained in another match of the set.
///
/// Sweeps in front order, where a match can only be contained by an
/// earlier one, tracking the furthest end among kept matches. The result
/// keeps the input's order.
pub fn prune_contained(set: MatchSet) -> MatchSet {
    let order = set.order();
    let sorted = set.reorder(SortOrder::FrontSorted);

    let mut kept: Vec<LocationMatch> = Vec::with_capacity(sorted.len());
    let mut furthest_end: Option<u64> = None;

    for m in sorted {
        if furthest_end.is_some_and(|end| end >= m.end()) {
            continue;
        }
        furthest_end = Some(m.end());
        kept.push(m);
    }

    MatchSet::from_matches(SortOrder::FrontSorted, kept).reorder(order)
}
