use std::path::PathBuf;
use xsearch::core::types::FileIdx;
use xsearch::index::file_index::FileIndex;
use xsearch::index::posting::PostingList;
use xsearch::index::tfidf::{TfIdfIndex, TermInfo, buckets_for_budget};

#[test]
fn repeated_pairs_accumulate_frequency() {
    let mut index = TfIdfIndex::new(13, 4096);
    index.insert(b"fox", FileIdx(0));
    index.insert(b"fox", FileIdx(0));
    index.insert(b"fox", FileIdx(1));
    index.insert(b"dog", FileIdx(1));

    assert_eq!(index.num_terms(), 2);
    assert_eq!(index.num_tokens(), 4);
    assert_eq!(index.num_docs(), 2);
    assert_eq!(index.term_freq(b"fox", FileIdx(0)), 2);
    assert_eq!(index.term_freq(b"fox", FileIdx(1)), 1);
    assert_eq!(index.term_freq(b"dog", FileIdx(0)), 0);
    assert_eq!(index.doc_freq(b"fox"), 2);
    assert_eq!(
        index.term_info(b"fox"),
        Some(TermInfo { doc_freq: 2, total_freq: 3 })
    );
    assert_eq!(index.term_info(b"cat"), None);
}

#[test]
fn single_bucket_table_still_separates_terms() {
    let mut index = TfIdfIndex::new(1, 4096);
    for term in ["a", "b", "c", "a"] {
        index.insert(term.as_bytes(), FileIdx(0));
    }

    assert_eq!(index.num_buckets(), 1);
    assert_eq!(index.num_terms(), 3);
    assert_eq!(index.term_freq(b"a", FileIdx(0)), 2);

    let mut terms: Vec<&[u8]> = index.terms().collect();
    terms.sort();
    assert_eq!(terms, vec![&b"a"[..], &b"b"[..], &b"c"[..]]);
}

#[test]
fn tiny_budget_yields_minimum_prime_bucket_count() {
    assert!(TfIdfIndex::bucket_size_in_bytes() > 1);
    assert_eq!(buckets_for_budget(0), 2);
    assert_eq!(buckets_for_budget(1), 2);
    assert_eq!(TfIdfIndex::with_capacity_budget(1, 4096).num_buckets(), 2);
}

#[test]
fn budget_rounds_up_to_a_prime() {
    let bucket = TfIdfIndex::bucket_size_in_bytes();
    let index = TfIdfIndex::with_capacity_budget(bucket * 100, 4096);
    assert_eq!(index.num_buckets(), 101);
    assert_eq!(index.page_size(), 4096);
}

#[test]
fn idf_and_tf_idf() {
    let mut index = TfIdfIndex::new(31, 4096);
    index.insert(b"common", FileIdx(0));
    index.insert(b"common", FileIdx(1));
    index.insert(b"rare", FileIdx(1));
    index.insert(b"rare", FileIdx(1));

    let total_docs = 2;
    let common = index.idf(b"common", total_docs);
    let rare = index.idf(b"rare", total_docs);
    assert!((common - (3.0f32 / 3.0).ln()).abs() < 1e-6);
    assert!((rare - (3.0f32 / 2.0).ln()).abs() < 1e-6);
    assert!(rare > common);
    assert!((index.tf_idf(b"rare", FileIdx(1), total_docs) - 2.0 * rare).abs() < 1e-6);
}

#[test]
fn posting_list_stays_sorted_for_out_of_order_files() {
    let mut list = PostingList::new();
    assert!(list.add_occurrence(FileIdx(5)));
    assert!(list.add_occurrence(FileIdx(2)));
    assert!(!list.add_occurrence(FileIdx(5)));
    assert!(list.add_occurrence(FileIdx(9)));
    assert!(!list.add_occurrence(FileIdx(2)));

    let files: Vec<u64> = list.postings.iter().map(|p| p.file_idx.0).collect();
    assert_eq!(files, vec![2, 5, 9]);
    assert_eq!(list.doc_freq(), 3);
    assert_eq!(list.total_freq(), 5);
    assert_eq!(list.get(FileIdx(5)).map(|p| p.term_freq), Some(2));
}

#[test]
fn file_index_hands_out_increasing_ids() {
    let index = FileIndex::new();
    let a = index.insert("/corpus/a.txt");
    let b = index.insert("/corpus/b.txt");
    // Not idempotent: a second insert of the same path gets a fresh id
    let a_again = index.insert("/corpus/a.txt");

    assert!(a < b && b < a_again);
    assert_eq!((a, b, a_again), (FileIdx(0), FileIdx(1), FileIdx(2)));
    assert_eq!(index.len(), 3);
    assert_eq!(index.get(b), Some(PathBuf::from("/corpus/b.txt")));
    assert_eq!(index.get(FileIdx(10)), None);
    assert_eq!(index.entries()[2], (FileIdx(2), PathBuf::from("/corpus/a.txt")));
}
