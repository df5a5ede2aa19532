//! Suffix array writer
//!
//! Writes index data structures to disk in a format optimized for
//! memory-mapped reading.

use super::builder::BuiltSuffixArray;
use super::types::*;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Writes index files to an index directory
pub struct SuffixArrayWriter;

impl SuffixArrayWriter {
    /// Write all index files to a directory, creating it if needed
    ///
    /// Creates:
    /// - text.bin: Concatenated record text
    /// - records.idx: Record start offsets
    /// - sa.bin: The suffix array itself
    /// - meta.json: Index metadata and build configuration
    pub fn write(index_path: &Path, built_sa: &BuiltSuffixArray) -> Result<()> {
        fs::create_dir_all(index_path)
            .with_context(|| format!("Failed to create {}", index_path.display()))?;

        Self::write_text(index_path, &built_sa.text)?;
        Self::write_records(index_path, &built_sa.record_starts, built_sa.text.len() as u64)?;
        Self::write_suffix_array(index_path, &built_sa.suffix_array)?;
        Self::write_meta(index_path, &built_sa.meta())?;

        info!(path = %index_path.display(), "wrote index");
        Ok(())
    }

    /// Write concatenated text to text.bin
    fn write_text(index_path: &Path, text: &[u8]) -> Result<()> {
        let path = index_path.join("text.bin");
        let mut file = BufWriter::with_capacity(
            65536,
            File::create(&path).context("Failed to create text.bin")?,
        );
        file.write_all(text)?;
        file.flush()?;
        Ok(())
    }

    /// Write record index to records.idx
    fn write_records(index_path: &Path, record_starts: &[TextPosition], text_size: u64) -> Result<()> {
        let path = index_path.join("records.idx");
        let mut file = BufWriter::with_capacity(
            65536,
            File::create(&path).context("Failed to create records.idx")?,
        );

        // Write header
        let header = RecordIndexHeader::new(record_starts.len() as u32, text_size);
        file.write_all(&header.magic.to_le_bytes())?;
        file.write_all(&header.version.to_le_bytes())?;
        file.write_all(&header.record_count.to_le_bytes())?;
        file.write_all(&header.text_size.to_le_bytes())?;
        file.write_all(&header.flags.to_le_bytes())?;

        // Write entries
        for start in record_starts {
            file.write_all(&start.to_le_bytes())?;
        }

        file.flush()?;
        Ok(())
    }

    /// Write suffix array to sa.bin
    fn write_suffix_array(index_path: &Path, sa: &[SuffixEntry]) -> Result<()> {
        let path = index_path.join("sa.bin");
        let mut file = BufWriter::with_capacity(
            65536,
            File::create(&path).context("Failed to create sa.bin")?,
        );

        // Write header
        let header = SuffixArrayHeader::new(sa.len() as u64);
        file.write_all(&header.magic.to_le_bytes())?;
        file.write_all(&header.version.to_le_bytes())?;
        file.write_all(&header.suffix_count.to_le_bytes())?;
        file.write_all(&header.flags.to_le_bytes())?;

        // Write suffix array entries
        // Using a buffer to reduce system call overhead
        let mut buffer = Vec::with_capacity(8 * 1024); // 1024 entries at a time
        for &entry in sa {
            buffer.extend_from_slice(&entry.to_le_bytes());
            if buffer.len() >= 8 * 1024 {
                file.write_all(&buffer)?;
                buffer.clear();
            }
        }
        if !buffer.is_empty() {
            file.write_all(&buffer)?;
        }

        file.flush()?;
        Ok(())
    }

    /// Write metadata to meta.json
    fn write_meta(index_path: &Path, meta: &IndexMeta) -> Result<()> {
        let path = index_path.join("meta.json");
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(&path, json).context("Failed to write meta.json")?;
        Ok(())
    }
}
