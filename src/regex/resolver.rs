//! Primitive range resolution over a suffix array
//!
//! Resolves a wildcard-free regex to the suffix-array ranges whose
//! suffixes start with a match. Resolution works by forward narrowing:
//! starting from the full range at depth zero, each node maps a uniform
//! range (all suffixes share one prefix of `length` bytes) to the uniform
//! sub-ranges in which the node matches right after that prefix.
//!
//! Because every output range is uniform, each one stands for exactly one
//! matched string, and its `length` is that string's length.

use super::ast::{Primitive, RegEx};
use super::matches::RangeMatch;
use crate::index::access::SuffixArrayAccess;
use anyhow::{Result, bail};
use rustc_hash::FxHashSet;

/// Resolves regex nodes against any [`SuffixArrayAccess`] implementation
pub struct SuffixArrayResolver<'a, A: SuffixArrayAccess + ?Sized> {
    sa: &'a A,
}

impl<'a, A: SuffixArrayAccess + ?Sized> SuffixArrayResolver<'a, A> {
    pub fn new(sa: &'a A) -> Self {
        Self { sa }
    }

    /// All non-empty match ranges of `node` over the whole index
    pub fn resolve(&self, node: &RegEx) -> Result<Vec<RangeMatch>> {
        let Some(full) = self.sa.full_range() else {
            return Ok(Vec::new());
        };

        let mut ranges = self.extend(node, full)?;
        // Zero-length results are the empty match, which is never reported
        ranges.retain(|r| r.length > 0);
        Ok(ranges)
    }

    /// Sub-ranges of `range` in which `node` matches after the shared prefix
    pub fn extend(&self, node: &RegEx, range: RangeMatch) -> Result<Vec<RangeMatch>> {
        if range.empty() {
            return Ok(Vec::new());
        }

        match node {
            RegEx::Blank => Ok(vec![range]),
            RegEx::Primitive(p) => Ok(self.extend_primitive(p, range)),
            RegEx::Concat(a, b) => {
                let mut out = Vec::new();
                for mid in self.extend(a, range)? {
                    out.extend(self.extend(b, mid)?);
                }
                Ok(dedup(out))
            }
            RegEx::Union(a, b) => {
                let mut out = self.extend(a, range)?;
                out.extend(self.extend(b, range)?);
                Ok(dedup(out))
            }
            RegEx::Repeat(inner, kind) => {
                let (min, max) = kind.bounds();
                self.extend_repeat(inner, min, max, range)
            }
            RegEx::Wildcard(..) => {
                bail!("unsupported pattern: '.*' nested inside '{}'", node)
            }
        }
    }

    fn extend_primitive(&self, primitive: &Primitive, range: RangeMatch) -> Vec<RangeMatch> {
        let config = self.sa.config();
        let delim = config.record_delim;

        match primitive {
            Primitive::Mgram(bytes) => self.sa.narrow(range, bytes).into_iter().collect(),
            Primitive::Dot => self
                .sa
                .byte_partitions(range)
                .into_iter()
                .filter(|&(b, _)| b != delim)
                .map(|(_, r)| r)
                .collect(),
            Primitive::CharRange { set, negated } => {
                // Text bytes are already folded; a folded byte matches if
                // the class holds it or its uppercase form
                let in_set = |b: u8| {
                    set.contains(b) || (config.case_insensitive && set.contains(b.to_ascii_uppercase()))
                };
                self.sa
                    .byte_partitions(range)
                    .into_iter()
                    .filter(|&(b, _)| {
                        if *negated {
                            !in_set(b) && b != delim
                        } else {
                            in_set(b)
                        }
                    })
                    .map(|(_, r)| r)
                    .collect()
            }
        }
    }

    /// Iterate `inner` between `min` and `max` times.
    ///
    /// Past `min`, a range already produced is not expanded again, which
    /// stops iteration when `inner` can match the empty string.
    fn extend_repeat(
        &self,
        inner: &RegEx,
        min: u32,
        max: Option<u32>,
        range: RangeMatch,
    ) -> Result<Vec<RangeMatch>> {
        let mut out = Vec::new();
        let mut seen: FxHashSet<RangeMatch> = FxHashSet::default();
        let mut frontier = vec![range];
        let mut step = 0u32;

        loop {
            if step >= min {
                frontier.retain(|r| seen.insert(*r));
                out.extend(frontier.iter().copied());
            }
            if frontier.is_empty() || max == Some(step) {
                break;
            }

            let mut next = Vec::new();
            for r in &frontier {
                next.extend(self.extend(inner, *r)?);
            }
            frontier = dedup(next);
            step += 1;
        }

        Ok(out)
    }
}

fn dedup(ranges: Vec<RangeMatch>) -> Vec<RangeMatch> {
    let mut seen: FxHashSet<RangeMatch> = FxHashSet::default();
    ranges.into_iter().filter(|r| seen.insert(*r)).collect()
}
