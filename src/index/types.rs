//! Types for the suffix array index
//!
//! This module defines the on-disk headers, configuration and metadata
//! shared by the builder, writer and reader.

use serde::{Deserialize, Serialize};

/// Position in the indexed text (supports up to 16 exabytes)
pub type TextPosition = u64;

/// Suffix array entry - position in the indexed text
pub type SuffixEntry = u64;

/// Record ordinal, in insertion order
pub type RecordId = u32;

/// Magic number for index files
pub const SA_MAGIC: u32 = 0x58455253; // "SREX" in little-endian

/// Current version of the index format
pub const SA_VERSION: u32 = 1;

/// Default record delimiter
pub const DEFAULT_RECORD_DELIM: u8 = b'\n';

/// Configuration for index building
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Byte terminating every record (default: newline)
    pub record_delim: u8,
    /// Build a case-insensitive index by lowercasing ASCII text (default: false)
    pub case_insensitive: bool,
    /// Maximum number of bytes accepted into one index (default: 1GB)
    pub max_input_size: u64,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            record_delim: DEFAULT_RECORD_DELIM,
            case_insensitive: false,
            max_input_size: 1024 * 1024 * 1024, // 1GB
        }
    }
}

impl IndexConfig {
    /// Fold a query byte the same way indexed text was folded
    #[inline]
    pub fn fold(&self, byte: u8) -> u8 {
        if self.case_insensitive {
            byte.to_ascii_lowercase()
        } else {
            byte
        }
    }
}

/// Index metadata stored in meta.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexMeta {
    /// Format version
    pub version: u32,
    /// Total size of the indexed text
    pub text_size: u64,
    /// Number of suffixes (equals text_size)
    pub suffix_count: u64,
    /// Number of records
    pub record_count: u32,
    /// Number of records rejected by the builder
    pub excluded_count: u32,
    /// Configuration the index was built with
    pub config: IndexConfig,
}

/// Header for sa.bin file
#[derive(Debug, Clone, Copy)]
pub struct SuffixArrayHeader {
    /// Magic number (SA_MAGIC)
    pub magic: u32,
    /// Version number
    pub version: u32,
    /// Number of suffix entries
    pub suffix_count: u64,
    /// Flags (reserved for future use)
    pub flags: u32,
}

impl SuffixArrayHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 4 + 4 + 8 + 4; // 20 bytes

    pub fn new(suffix_count: u64) -> Self {
        Self {
            magic: SA_MAGIC,
            version: SA_VERSION,
            suffix_count,
            flags: 0,
        }
    }
}

/// Header for records.idx file
#[derive(Debug, Clone, Copy)]
pub struct RecordIndexHeader {
    /// Magic number (SA_MAGIC)
    pub magic: u32,
    /// Version number
    pub version: u32,
    /// Number of records
    pub record_count: u32,
    /// Total size of the indexed text
    pub text_size: u64,
    /// Flags (reserved)
    pub flags: u32,
}

impl RecordIndexHeader {
    /// Size of header in bytes
    pub const SIZE: usize = 4 + 4 + 4 + 8 + 4; // 24 bytes

    /// Size of each record start entry in bytes
    pub const ENTRY_SIZE: usize = 8;

    pub fn new(record_count: u32, text_size: u64) -> Self {
        Self {
            magic: SA_MAGIC,
            version: SA_VERSION,
            record_count,
            text_size,
            flags: 0,
        }
    }
}

/// Statistics about an index
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub text_size: usize,
    pub suffix_count: u64,
    pub record_count: usize,
    pub case_insensitive: bool,
}
