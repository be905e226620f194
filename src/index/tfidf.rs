use std::collections::HashSet;
use std::collections::hash_map::RandomState;
use std::fmt;
use std::hash::BuildHasher;
use crate::core::types::FileIdx;
use crate::index::posting::{Posting, PostingList};

/// Term statistics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TermInfo {
    pub doc_freq: u32,        // Number of files containing the term
    pub total_freq: u64,      // Total occurrences across all files
}

struct TermEntry {
    term: Box<[u8]>,
    postings: PostingList,
}

type Bucket = Vec<TermEntry>;

/// One lane's TF-IDF shard.
///
/// A chained hash table with a bucket count fixed at construction. Keys are
/// raw term bytes; each term keeps a posting list of per-file frequencies.
pub struct TfIdfIndex {
    buckets: Vec<Bucket>,
    hasher: RandomState,
    num_terms: usize,
    num_tokens: u64,
    files: HashSet<FileIdx>,
    page_size: usize,
}

impl TfIdfIndex {
    pub fn new(num_buckets: usize, page_size: usize) -> Self {
        let num_buckets = num_buckets.max(1);
        let mut buckets = Vec::with_capacity(num_buckets);
        buckets.resize_with(num_buckets, Vec::new);

        TfIdfIndex {
            buckets,
            hasher: RandomState::new(),
            num_terms: 0,
            num_tokens: 0,
            files: HashSet::new(),
            page_size,
        }
    }

    /// Size the table from a memory budget: the smallest prime bucket count
    /// at or above `capacity / bucket_size_in_bytes()`.
    pub fn with_capacity_budget(capacity: usize, page_size: usize) -> Self {
        TfIdfIndex::new(buckets_for_budget(capacity), page_size)
    }

    pub fn bucket_size_in_bytes() -> usize {
        std::mem::size_of::<Bucket>()
    }

    /// Count one occurrence of `term` in `file_idx`. Repeats accumulate.
    pub fn insert(&mut self, term: &[u8], file_idx: FileIdx) {
        let slot = self.slot(term);
        let bucket = &mut self.buckets[slot];
        self.num_tokens += 1;
        self.files.insert(file_idx);

        if let Some(entry) = bucket.iter_mut().find(|e| &*e.term == term) {
            entry.postings.add_occurrence(file_idx);
            return;
        }

        let mut postings = PostingList::new();
        postings.add_occurrence(file_idx);
        bucket.push(TermEntry {
            term: term.into(),
            postings,
        });
        self.num_terms += 1;
    }

    /// Distinct terms in the shard.
    pub fn num_terms(&self) -> usize {
        self.num_terms
    }

    /// Total inserts, counting repeats.
    pub fn num_tokens(&self) -> u64 {
        self.num_tokens
    }

    /// Distinct files that contributed at least one term.
    pub fn num_docs(&self) -> usize {
        self.files.len()
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn term_info(&self, term: &[u8]) -> Option<TermInfo> {
        self.entry(term).map(|e| TermInfo {
            doc_freq: e.postings.doc_freq(),
            total_freq: e.postings.total_freq(),
        })
    }

    pub fn doc_freq(&self, term: &[u8]) -> u32 {
        self.entry(term).map_or(0, |e| e.postings.doc_freq())
    }

    pub fn term_freq(&self, term: &[u8], file_idx: FileIdx) -> u32 {
        self.entry(term)
            .and_then(|e| e.postings.get(file_idx))
            .map_or(0, |p| p.term_freq)
    }

    pub fn postings(&self, term: &[u8]) -> Option<&[Posting]> {
        self.entry(term).map(|e| e.postings.postings.as_slice())
    }

    /// IDF = ln((N + 1) / (df + 1))
    pub fn idf(&self, term: &[u8], total_docs: usize) -> f32 {
        let doc_freq = self.doc_freq(term);
        ((total_docs as f32 + 1.0) / (doc_freq as f32 + 1.0)).ln()
    }

    pub fn tf_idf(&self, term: &[u8], file_idx: FileIdx, total_docs: usize) -> f32 {
        self.term_freq(term, file_idx) as f32 * self.idf(term, total_docs)
    }

    /// Every term currently stored, in bucket order.
    pub fn terms(&self) -> impl Iterator<Item = &[u8]> {
        self.buckets.iter().flatten().map(|e| &*e.term)
    }

    fn entry(&self, term: &[u8]) -> Option<&TermEntry> {
        self.buckets[self.slot(term)].iter().find(|e| &*e.term == term)
    }

    fn slot(&self, term: &[u8]) -> usize {
        (self.hasher.hash_one(term) % self.buckets.len() as u64) as usize
    }
}

impl fmt::Debug for TfIdfIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("TfIdfIndex")
            .field("num_buckets", &self.buckets.len())
            .field("num_terms", &self.num_terms)
            .field("num_tokens", &self.num_tokens)
            .field("num_docs", &self.files.len())
            .finish()
    }
}

pub fn buckets_for_budget(capacity: usize) -> usize {
    next_prime(capacity / TfIdfIndex::bucket_size_in_bytes())
}

/// Smallest prime `>= n`; never less than 2.
pub fn next_prime(n: usize) -> usize {
    let mut candidate = n.max(2);
    while !is_prime(candidate) {
        candidate += 1;
    }
    candidate
}

fn is_prime(n: usize) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}
