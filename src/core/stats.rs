use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::core::types::LaneId;

/// Outcome of one full pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: u64,

    // Input
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub files_failed: usize,
    pub bytes_read: u64,

    // Indexing
    pub blocks_processed: u64,
    pub total_terms: usize,

    pub lanes: Vec<LaneReport>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaneReport {
    pub lane: LaneId,
    pub numa_node: usize,
    pub reader: ReaderStats,
    pub indexer: IndexerStats,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReaderStats {
    pub files_indexed: usize,
    pub files_skipped: usize,     // Could not be opened
    pub files_failed: usize,      // Opened, then failed mid-read
    pub bytes_read: u64,
    pub blocks_pushed: u64,
}

impl ReaderStats {
    pub fn absorb(&mut self, file: &FileReadStats) {
        self.files_indexed += 1;
        self.bytes_read += file.bytes;
        self.blocks_pushed += file.blocks;
    }

    /// Files this reader has dealt with, however they ended.
    pub fn files_seen(&self) -> usize {
        self.files_indexed + self.files_skipped + self.files_failed
    }
}

/// Per-file counters produced by a single read pass
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct FileReadStats {
    pub bytes: u64,
    pub blocks: u64,      // Includes the trailing end-of-file block
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexerStats {
    pub blocks_processed: u64,
    pub blocks_tokenized: u64,
    pub end_of_file_markers: u64,
    pub tokens_inserted: u64,
    pub num_terms: usize,
}

impl PipelineReport {
    pub fn is_empty(&self) -> bool {
        self.files_indexed == 0
    }
}
