//! Regex executor
//!
//! Walks a [`RegEx`] tree and combines results. Wildcard nodes are joined
//! here from their two sides; every other node is handed to the index as
//! a primitive and its raw ranges converted to location matches.

use super::ast::RegEx;
use super::convert::range_results_to_matches;
use super::matches::{MatchSet, RangeMatch, SortOrder};
use super::wildcard::merge_wildcard;
use anyhow::{Result, bail};
use std::time::{Duration, Instant};
use tracing::debug;

/// Operations the executor needs from an index backend
pub trait SuccinctIndex {
    /// Document offset of the suffix at sorted position `position`
    fn index_to_offset(&self, position: u64) -> u64;

    /// Document offsets of every position in a range, in range order
    fn range_to_offsets(&self, range: &RangeMatch) -> Vec<u64> {
        if range.empty() {
            return Vec::new();
        }
        (range.begin..=range.end)
            .map(|position| self.index_to_offset(position))
            .collect()
    }

    /// Raw range matches for a node the executor does not decompose
    fn resolve_primitive(&self, node: &RegEx) -> Result<Vec<RangeMatch>>;
}

/// How overlapping matches are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// Longest match per position, contained matches removed; gap sides
    /// are pruned separately and their joined spans kept whole
    #[default]
    Greedy,
    /// Every match at every position
    NonGreedy,
}

#[derive(Debug, Clone, Default)]
pub struct ExecutorConfig {
    pub mode: MatchMode,
    /// Evaluate the two sides of a wildcard in parallel
    pub parallel: bool,
    /// Abandon evaluation after this long
    pub timeout: Option<Duration>,
}

/// Regex executor over a [`SuccinctIndex`]
pub struct RegExExecutor<'a, I: ?Sized> {
    index: &'a I,
    config: ExecutorConfig,
}

impl<'a, I: SuccinctIndex + Sync + ?Sized> RegExExecutor<'a, I> {
    pub fn new(index: &'a I, config: ExecutorConfig) -> Self {
        Self { index, config }
    }

    /// Evaluate a regex, returning matches sorted by offset
    pub fn evaluate(&self, regex: &RegEx) -> Result<MatchSet> {
        let deadline = self.config.timeout.map(|t| Instant::now() + t);
        self.compute(regex, SortOrder::FrontSorted, deadline)
    }

    /// Compute the matches of `node`, sorted by `order`
    fn compute(&self, node: &RegEx, order: SortOrder, deadline: Option<Instant>) -> Result<MatchSet> {
        if deadline.is_some_and(|d| Instant::now() >= d) {
            bail!("regex evaluation timed out");
        }

        let results = match node {
            RegEx::Wildcard(left, right) => {
                let (left, right) = if self.config.parallel {
                    rayon::join(
                        || self.compute(left, SortOrder::EndSorted, deadline),
                        || self.compute(right, SortOrder::FrontSorted, deadline),
                    )
                } else {
                    (
                        self.compute(left, SortOrder::EndSorted, deadline),
                        self.compute(right, SortOrder::FrontSorted, deadline),
                    )
                };
                merge_wildcard(left?, right?, order)
            }
            // Joined spans are never pruned, so neither is their union
            RegEx::Union(a, b) if node.contains_wildcard() => self
                .compute(a, order, deadline)?
                .union(self.compute(b, order, deadline)?),
            _ => {
                let ranges = self.index.resolve_primitive(node)?;
                range_results_to_matches(self.index, &ranges, self.config.mode, order)
            }
        };

        debug!(node = %node, ?order, matches = results.len(), "computed");
        Ok(results)
    }
}

/// Evaluate `regex` against `index` with default settings and `mode`
pub fn evaluate<I: SuccinctIndex + Sync + ?Sized>(
    index: &I,
    regex: &RegEx,
    mode: MatchMode,
) -> Result<MatchSet> {
    let config = ExecutorConfig {
        mode,
        ..Default::default()
    };
    RegExExecutor::new(index, config).evaluate(regex)
}
