use std::path::PathBuf;
use rayon::prelude::*;
use serde::{Serialize, Deserialize};
use crate::core::types::{FileIdx, LaneId};
use crate::memory::registry::{ComponentKind, MemoryComponentRegistry};

/// One file containing a looked-up term
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermHit {
    pub lane: LaneId,
    pub file_idx: FileIdx,
    pub path: Option<PathBuf>,
    pub term_freq: u32,
    pub tf_idf: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermLookup {
    pub term: String,
    pub doc_freq: u32,        // Summed over shards; file ids never repeat across lanes
    pub hits: Vec<TermHit>,   // Sorted by (lane, file_idx)
}

/// Read-only view over every lane's shard and file index.
///
/// Shards are independent, so lookups fan out with rayon and the results
/// are concatenated. Safe to use while indexers run; each shard is read
/// under its own lock.
pub struct IndexView<'r> {
    registry: &'r MemoryComponentRegistry,
    lanes: Vec<LaneId>,
}

impl<'r> IndexView<'r> {
    pub fn new(registry: &'r MemoryComponentRegistry) -> Self {
        IndexView {
            registry,
            lanes: registry.lanes(ComponentKind::TfIdfIndex),
        }
    }

    pub fn lanes(&self) -> &[LaneId] {
        &self.lanes
    }

    /// Files that contributed terms, across all shards.
    pub fn total_docs(&self) -> usize {
        self.lanes
            .par_iter()
            .filter_map(|&lane| self.registry.tfidf_index(lane).ok())
            .map(|shard| shard.read().num_docs())
            .sum()
    }

    /// Sum of every shard's distinct-term count.
    pub fn total_terms(&self) -> usize {
        self.lanes
            .par_iter()
            .filter_map(|&lane| self.registry.tfidf_index(lane).ok())
            .map(|shard| shard.read().num_terms())
            .sum()
    }

    pub fn lookup(&self, term: &str) -> TermLookup {
        let total_docs = self.total_docs();
        let key = term.as_bytes();

        let mut hits: Vec<TermHit> = self.lanes
            .par_iter()
            .filter_map(|&lane| {
                let shard = self.registry.tfidf_index(lane).ok()?.read();
                let files = self.registry.file_index(lane).ok();
                let postings = shard.postings(key)?;

                let lane_hits: Vec<TermHit> = postings
                    .iter()
                    .map(|p| TermHit {
                        lane,
                        file_idx: p.file_idx,
                        path: files.and_then(|f| f.get(p.file_idx)),
                        term_freq: p.term_freq,
                        tf_idf: 0.0,
                    })
                    .collect();
                Some(lane_hits)
            })
            .flatten()
            .collect();
        hits.sort_by_key(|h| (h.lane, h.file_idx));

        // IDF = ln((N + 1) / (df + 1)) over the whole corpus
        let doc_freq = hits.len() as u32;
        let idf = ((total_docs as f32 + 1.0) / (doc_freq as f32 + 1.0)).ln();
        for hit in &mut hits {
            hit.tf_idf = hit.term_freq as f32 * idf;
        }

        TermLookup {
            term: term.to_string(),
            doc_freq,
            hits,
        }
    }
}
