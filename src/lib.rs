//! # sarex - Regex search over suffix arrays
//!
//! sarex answers regular-expression queries against a suffix-array index
//! of a delimiter-separated text, without scanning the text.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Suffix array building, persistence, range search and record queries
//! - [`regex`] - Regex parsing, range resolution, match conversion and execution
//! - [`output`] - Result formatting (colored text or JSON lines)
//!
//! ## Quick Start
//!
//! ```ignore
//! use sarex::index::{RecordSearch, SuffixArrayReader};
//! use sarex::regex::ExecutorConfig;
//! use std::path::Path;
//!
//! // Open an existing index
//! let reader = SuffixArrayReader::open(Path::new("/path/to/index")).unwrap();
//!
//! // Evaluate a regex
//! let matches = reader.regex_search("fn .*main", &ExecutorConfig::default()).unwrap();
//!
//! for m in &matches {
//!     println!("{} +{}", m.offset, m.length);
//! }
//! ```
//!
//! ## Evaluation
//!
//! Wildcard-free subpatterns are resolved by narrowing suffix-array ranges,
//! then converted to `(offset, length)` matches. A `.*` gap splits the
//! pattern, and the matches of both sides are joined with a single
//! merge pass.

pub mod index;
pub mod output;
pub mod regex;
