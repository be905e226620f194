use serde::{Serialize, Deserialize};
use crate::core::types::FileIdx;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub file_idx: FileIdx,
    pub term_freq: u32,       // Occurrences of the term in this file
}

/// Posting list for a term
/// Note: Sorted by file_idx; a lane hands out ids in increasing order so appends dominate
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    pub postings: Vec<Posting>,
}

impl PostingList {
    pub fn new() -> Self {
        PostingList {
            postings: Vec::new(),
        }
    }

    /// Count one occurrence of the term in `file_idx`.
    /// Returns true when this is the first occurrence in that file.
    pub fn add_occurrence(&mut self, file_idx: FileIdx) -> bool {
        // Fast path: same file as the last insert
        if let Some(last) = self.postings.last_mut() {
            if last.file_idx == file_idx {
                last.term_freq += 1;
                return false;
            }
            if last.file_idx < file_idx {
                self.postings.push(Posting { file_idx, term_freq: 1 });
                return true;
            }
        }

        match self.postings.binary_search_by_key(&file_idx, |p| p.file_idx) {
            Ok(pos) => {
                self.postings[pos].term_freq += 1;
                false
            }
            Err(pos) => {
                self.postings.insert(pos, Posting { file_idx, term_freq: 1 });
                true
            }
        }
    }

    pub fn get(&self, file_idx: FileIdx) -> Option<&Posting> {
        self.postings
            .binary_search_by_key(&file_idx, |p| p.file_idx)
            .ok()
            .map(|pos| &self.postings[pos])
    }

    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }

    pub fn doc_freq(&self) -> u32 {
        self.postings.len() as u32
    }

    pub fn total_freq(&self) -> u64 {
        self.postings.iter().map(|p| p.term_freq as u64).sum()
    }
}
