pub mod access;
pub mod builder;
pub mod reader;
pub mod records;
pub mod types;
pub mod writer;

pub use access::SuffixArrayAccess;
pub use builder::{BuiltSuffixArray, SuffixArrayBuilder};
pub use reader::SuffixArrayReader;
pub use records::RecordSearch;
pub use types::*;
pub use writer::SuffixArrayWriter;
