pub mod file_index;
pub mod posting;
pub mod tfidf;
pub mod view;
