//! Suffix array reader
//!
//! Provides memory-mapped access to a persisted index.

use super::access::SuffixArrayAccess;
use super::types::*;
use crate::regex::ast::RegEx;
use crate::regex::executor::SuccinctIndex;
use crate::regex::matches::RangeMatch;
use crate::regex::resolver::SuffixArrayResolver;
use anyhow::{Context, Result, bail};
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;
use tracing::info;

/// Reader for a persisted index directory
///
/// Uses memory-mapped files for efficient access without loading
/// the entire suffix array into memory.
pub struct SuffixArrayReader {
    /// Memory-mapped indexed text
    text_mmap: Mmap,
    /// Memory-mapped suffix array
    sa_mmap: Mmap,
    /// Record start offsets (small enough to keep in memory)
    record_starts: Vec<TextPosition>,
    /// Number of suffixes
    suffix_count: u64,
    /// Build configuration from meta.json
    config: IndexConfig,
}

impl SuffixArrayReader {
    /// Open an index directory written by `SuffixArrayWriter`
    pub fn open(index_path: &Path) -> Result<Self> {
        let meta = Self::read_meta(&index_path.join("meta.json"))?;

        // Memory-map the indexed text
        let text_file = File::open(index_path.join("text.bin"))
            .context("Failed to open text.bin")?;
        let text_mmap = unsafe { Mmap::map(&text_file) }.context("Failed to map text.bin")?;

        let sa_file = File::open(index_path.join("sa.bin"))
            .context("Failed to open sa.bin")?;
        let sa_mmap = unsafe { Mmap::map(&sa_file) }.context("Failed to map sa.bin")?;

        // Validate and read suffix array header
        if sa_mmap.len() < SuffixArrayHeader::SIZE {
            bail!("Invalid sa.bin: file too small");
        }
        if read_u32(&sa_mmap, 0)? != SA_MAGIC {
            bail!("Invalid sa.bin: bad magic number");
        }
        let version = read_u32(&sa_mmap, 4)?;
        if version != SA_VERSION {
            bail!("Unsupported sa.bin version: {}", version);
        }

        let suffix_count = read_u64(&sa_mmap, 8)?;
        if sa_mmap.len() as u64 != SuffixArrayHeader::SIZE as u64 + suffix_count * 8 {
            bail!("Invalid sa.bin: expected {} entries", suffix_count);
        }
        if suffix_count != text_mmap.len() as u64 {
            bail!(
                "Index mismatch: {} suffixes for {} bytes of text",
                suffix_count,
                text_mmap.len()
            );
        }

        let record_starts = Self::read_records(&index_path.join("records.idx"))?;

        info!(
            path = %index_path.display(),
            text_size = text_mmap.len(),
            records = record_starts.len(),
            "opened index"
        );

        Ok(Self {
            text_mmap,
            sa_mmap,
            record_starts,
            suffix_count,
            config: meta.config,
        })
    }

    fn read_meta(meta_path: &Path) -> Result<IndexMeta> {
        let data = std::fs::read(meta_path)
            .with_context(|| format!("Failed to read {}", meta_path.display()))?;
        let meta: IndexMeta = serde_json::from_slice(&data).context("Invalid meta.json")?;
        if meta.version != SA_VERSION {
            bail!("Unsupported index version: {}", meta.version);
        }
        Ok(meta)
    }

    /// Read record start offsets from records.idx
    fn read_records(idx_path: &Path) -> Result<Vec<TextPosition>> {
        let data = std::fs::read(idx_path).context("Failed to read records.idx")?;

        if data.len() < RecordIndexHeader::SIZE {
            bail!("Invalid records.idx: file too small");
        }
        if read_u32(&data, 0)? != SA_MAGIC {
            bail!("Invalid records.idx: bad magic number");
        }

        let record_count = read_u32(&data, 8)? as usize;
        let expected = RecordIndexHeader::SIZE + record_count * RecordIndexHeader::ENTRY_SIZE;
        if data.len() < expected {
            bail!("Invalid records.idx: truncated");
        }

        (0..record_count)
            .map(|i| read_u64(&data, RecordIndexHeader::SIZE + i * RecordIndexHeader::ENTRY_SIZE))
            .collect()
    }

    /// Get statistics about this index
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            text_size: self.text_mmap.len(),
            suffix_count: self.suffix_count,
            record_count: self.record_starts.len(),
            case_insensitive: self.config.case_insensitive,
        }
    }
}

impl SuffixArrayAccess for SuffixArrayReader {
    fn suffix_count(&self) -> u64 {
        self.suffix_count
    }

    /// Get suffix at index i in the suffix array
    #[inline]
    fn suffix_at(&self, i: u64) -> TextPosition {
        let byte_offset = SuffixArrayHeader::SIZE + (i as usize * 8);
        let mut buf = [0u8; 8];
        buf.copy_from_slice(&self.sa_mmap[byte_offset..byte_offset + 8]);
        u64::from_le_bytes(buf)
    }

    #[inline]
    fn text(&self) -> &[u8] {
        &self.text_mmap
    }

    fn record_starts(&self) -> &[TextPosition] {
        &self.record_starts
    }

    fn config(&self) -> &IndexConfig {
        &self.config
    }
}

impl SuccinctIndex for SuffixArrayReader {
    fn index_to_offset(&self, position: u64) -> u64 {
        self.suffix_at(position)
    }

    fn resolve_primitive(&self, node: &RegEx) -> Result<Vec<RangeMatch>> {
        SuffixArrayResolver::new(self).resolve(node)
    }
}

fn read_u32(data: &[u8], offset: usize) -> Result<u32> {
    let bytes = data
        .get(offset..offset + 4)
        .context("Unexpected end of file")?;
    Ok(u32::from_le_bytes(bytes.try_into()?))
}

fn read_u64(data: &[u8], offset: usize) -> Result<u64> {
    let bytes = data
        .get(offset..offset + 8)
        .context("Unexpected end of file")?;
    Ok(u64::from_le_bytes(bytes.try_into()?))
}
