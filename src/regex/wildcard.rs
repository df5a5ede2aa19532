//! Wildcard merge-join
//!
//! Combines the matches of `left` and `right` in `left.*right` into spans
//! running from a left match's start to a right match's end, for every
//! right match starting at or after the left match's end.

use super::matches::{LocationMatch, MatchSet, SortOrder};

/// Join left and right matches across an unconstrained gap.
///
/// `left` is swept in end order while a cursor into `right` (front order)
/// only moves forward: once a right match starts before some left end, it
/// starts before every later left end too. Each left match then pairs with
/// the whole remaining suffix of `right`, so the cost is
/// `O(|left| + |right| + pairs)`.
pub fn merge_wildcard(left: MatchSet, right: MatchSet, order: SortOrder) -> MatchSet {
    if left.is_empty() || right.is_empty() {
        return MatchSet::new(order);
    }

    let left = left.reorder(SortOrder::EndSorted);
    let right = right.reorder(SortOrder::FrontSorted);
    let right = right.as_slice();

    let mut joined = Vec::new();
    let mut cursor = 0;

    for l in &left {
        while cursor < right.len() && right[cursor].offset < l.end() {
            cursor += 1;
        }
        if cursor == right.len() {
            break;
        }

        joined.extend(
            right[cursor..]
                .iter()
                .map(|r| LocationMatch::new(l.offset, r.end() - l.offset)),
        );
    }

    MatchSet::from_matches(order, joined)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(offset: u64, length: u64) -> LocationMatch {
        LocationMatch::new(offset, length)
    }

    fn set(order: SortOrder, matches: &[LocationMatch]) -> MatchSet {
        MatchSet::from_matches(order, matches.to_vec())
    }

    #[test]
    fn test_only_admissible_right_matches_join() {
        let left = set(SortOrder::EndSorted, &[m(0, 2)]);
        let right = set(SortOrder::FrontSorted, &[m(5, 1), m(1, 1)]);
        let out = merge_wildcard(left, right, SortOrder::FrontSorted);
        assert_eq!(out.as_slice(), &[m(0, 6)]);
    }

    #[test]
    fn test_zero_gap_is_allowed() {
        let left = set(SortOrder::EndSorted, &[m(0, 3)]);
        let right = set(SortOrder::FrontSorted, &[m(3, 2)]);
        let out = merge_wildcard(left, right, SortOrder::FrontSorted);
        assert_eq!(out.as_slice(), &[m(0, 5)]);
    }

    #[test]
    fn test_empty_side_gives_empty_result() {
        let some = set(SortOrder::FrontSorted, &[m(0, 1)]);
        let none = MatchSet::new(SortOrder::FrontSorted);

        assert!(merge_wildcard(none.clone(), some.clone(), SortOrder::FrontSorted).is_empty());
        assert!(merge_wildcard(some, none, SortOrder::EndSorted).is_empty());
    }

    #[test]
    fn test_every_admissible_pair_is_emitted() {
        let left_matches = [m(0, 1), m(2, 2), m(7, 1)];
        let right_matches = [m(1, 1), m(4, 3), m(8, 1), m(10, 2)];

        let out = merge_wildcard(
            set(SortOrder::EndSorted, &left_matches),
            set(SortOrder::FrontSorted, &right_matches),
            SortOrder::FrontSorted,
        );

        let mut expected = Vec::new();
        for l in &left_matches {
            for r in &right_matches {
                if r.offset >= l.end() {
                    expected.push(m(l.offset, r.end() - l.offset));
                }
            }
        }
        assert_eq!(out.len(), expected.len());
        for e in &expected {
            assert!(out.contains(e), "missing {e}");
        }
    }

    #[test]
    fn test_output_order() {
        let left = set(SortOrder::EndSorted, &[m(0, 1), m(3, 1)]);
        let right = set(SortOrder::FrontSorted, &[m(5, 1), m(9, 1)]);

        let front = merge_wildcard(left.clone(), right.clone(), SortOrder::FrontSorted);
        let offsets: Vec<u64> = front.iter().map(|m| m.offset).collect();
        assert_eq!(offsets, vec![0, 0, 3, 3]);

        let end = merge_wildcard(left, right, SortOrder::EndSorted);
        let ends: Vec<u64> = end.iter().map(|m| m.end()).collect();
        assert_eq!(ends, vec![6, 6, 10, 10]);
    }

    #[test]
    fn test_inputs_in_wrong_order_are_resorted() {
        let left = set(SortOrder::FrontSorted, &[m(0, 9), m(1, 1)]);
        let right = set(SortOrder::EndSorted, &[m(3, 1), m(10, 1)]);
        let out = merge_wildcard(left, right, SortOrder::FrontSorted);
        assert_eq!(out.as_slice(), &[m(0, 11), m(1, 10), m(1, 3)]);
    }
}
