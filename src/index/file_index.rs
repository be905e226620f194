use std::path::{Path, PathBuf};
use parking_lot::RwLock;
use crate::core::types::FileIdx;

/// Per-lane registry of file paths.
///
/// Append-only: every `insert` allocates the next id, even for a path that
/// was inserted before. Callers insert each path at most once per lane.
#[derive(Debug, Default)]
pub struct FileIndex {
    paths: RwLock<Vec<PathBuf>>,
}

impl FileIndex {
    pub fn new() -> Self {
        FileIndex {
            paths: RwLock::new(Vec::new()),
        }
    }

    pub fn insert<P: AsRef<Path>>(&self, path: P) -> FileIdx {
        let mut paths = self.paths.write();
        let idx = FileIdx(paths.len() as u64);
        paths.push(path.as_ref().to_path_buf());
        idx
    }

    pub fn get(&self, idx: FileIdx) -> Option<PathBuf> {
        self.paths.read().get(idx.0 as usize).cloned()
    }

    pub fn len(&self) -> usize {
        self.paths.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.read().is_empty()
    }

    /// Snapshot of every registered path with its id.
    pub fn entries(&self) -> Vec<(FileIdx, PathBuf)> {
        self.paths
            .read()
            .iter()
            .enumerate()
            .map(|(i, path)| (FileIdx(i as u64), path.clone()))
            .collect()
    }
}
