//! Regex evaluation over a suffix-array index
//!
//! A pattern is parsed into a [`RegEx`] tree, and the [`RegExExecutor`]
//! evaluates it: wildcard-free subtrees are resolved to suffix-array ranges
//! by the index, converted to document matches, and wildcard nodes join
//! the matches of their two sides.

pub mod ast;
pub mod convert;
pub mod executor;
pub mod matches;
pub mod parser;
pub mod resolver;
pub mod wildcard;

pub use ast::{ByteSet, Primitive, RegEx, RepeatKind};
pub use convert::{prune_contained, range_results_to_matches};
pub use executor::{ExecutorConfig, MatchMode, RegExExecutor, SuccinctIndex, evaluate};
pub use matches::{LocationMatch, MatchSet, RangeMatch, SortOrder};
pub use parser::parse_regex;
pub use resolver::SuffixArrayResolver;
pub use wildcard::merge_wildcard;
