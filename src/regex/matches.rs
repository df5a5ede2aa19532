//! Match entities produced while evaluating a regex.
//!
//! A [`RangeMatch`] is a run of suffix-array positions that all match the
//! same text; a [`LocationMatch`] is a concrete span of the document. The
//! executor keeps location matches in a [`MatchSet`], a deduplicated
//! sequence sorted by one of the two [`SortOrder`]s.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// A matched span `[offset, offset + length)` of the indexed text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LocationMatch {
    pub offset: u64,
    pub length: u64,
}

impl LocationMatch {
    pub fn new(offset: u64, length: u64) -> Self {
        Self { offset, length }
    }

    /// Exclusive end position of the span
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }

    /// True if `other` lies entirely within this span
    #[inline]
    pub fn contains(&self, other: &LocationMatch) -> bool {
        self.offset <= other.offset && self.end() >= other.end()
    }
}

impl fmt::Display for LocationMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.offset, self.length)
    }
}

/// An inclusive range `[begin, end]` of suffix-array positions, each of
/// which starts an occurrence of `length` matched bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeMatch {
    pub begin: u64,
    pub end: u64,
    pub length: u64,
}

impl RangeMatch {
    pub fn new(begin: u64, end: u64, length: u64) -> Self {
        Self { begin, end, length }
    }

    /// True when the range holds no positions
    #[inline]
    pub fn empty(&self) -> bool {
        self.begin > self.end
    }

    /// Number of suffix-array positions in the range
    #[inline]
    pub fn count(&self) -> u64 {
        if self.empty() {
            0
        } else {
            self.end - self.begin + 1
        }
    }
}

/// Order in which a [`MatchSet`] keeps its matches.
///
/// Ties on the primary key put the longer match first, so a match is
/// always preceded by every match that contains it and shares its key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// By start offset
    #[default]
    FrontSorted,
    /// By end position (`offset + length`)
    EndSorted,
}

impl SortOrder {
    pub fn compare(self, a: &LocationMatch, b: &LocationMatch) -> Ordering {
        match self {
            SortOrder::FrontSorted => a
                .offset
                .cmp(&b.offset)
                .then_with(|| b.length.cmp(&a.length)),
            SortOrder::EndSorted => a.end().cmp(&b.end()).then_with(|| a.offset.cmp(&b.offset)),
        }
    }
}

/// A set of location matches sorted by a [`SortOrder`].
///
/// Matches are unique by `(offset, length)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MatchSet {
    order: SortOrder,
    matches: Vec<LocationMatch>,
}

impl MatchSet {
    /// Create an empty set
    pub fn new(order: SortOrder) -> Self {
        Self {
            order,
            matches: Vec::new(),
        }
    }

    /// Create a set from matches in any order, dropping duplicates
    pub fn from_matches(order: SortOrder, mut matches: Vec<LocationMatch>) -> Self {
        matches.sort_unstable_by(|a, b| order.compare(a, b));
        matches.dedup();
        Self { order, matches }
    }

    pub fn order(&self) -> SortOrder {
        self.order
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LocationMatch> {
        self.matches.iter()
    }

    pub fn as_slice(&self) -> &[LocationMatch] {
        &self.matches
    }

    pub fn into_vec(self) -> Vec<LocationMatch> {
        self.matches
    }

    /// Membership test in `O(log n)`
    pub fn contains(&self, m: &LocationMatch) -> bool {
        self.matches
            .binary_search_by(|probe| self.order.compare(probe, m))
            .is_ok()
    }

    /// Re-sort into `order`; free when the set is already in that order
    pub fn reorder(mut self, order: SortOrder) -> Self {
        if self.order != order {
            self.matches.sort_unstable_by(|a, b| order.compare(a, b));
            self.order = order;
        }
        self
    }

    /// Union with another set, keeping this set's order
    pub fn union(self, other: MatchSet) -> Self {
        let order = self.order;
        let mut matches = self.matches;
        matches.extend(other.matches);
        Self::from_matches(order, matches)
    }
}

impl IntoIterator for MatchSet {
    type Item = LocationMatch;
    type IntoIter = std::vec::IntoIter<LocationMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.into_iter()
    }
}

impl<'a> IntoIterator for &'a MatchSet {
    type Item = &'a LocationMatch;
    type IntoIter = std::slice::Iter<'a, LocationMatch>;

    fn into_iter(self) -> Self::IntoIter {
        self.matches.iter()
    }
}
