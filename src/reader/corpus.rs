use std::path::{Path, PathBuf};
use ignore::WalkBuilder;

/// Expand the given inputs into the list of files to index.
///
/// Directories are walked recursively (hidden entries and ignore files are
/// not filtered) and their files sorted. Anything else is kept as given, so a
/// missing path still reaches a reader and is counted as skipped there.
pub fn collect_files<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        let input = input.as_ref();
        if input.is_dir() {
            files.extend(walk_directory(input));
        } else {
            files.push(input.to_path_buf());
        }
    }

    files
}

fn walk_directory(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkBuilder::new(root)
        .standard_filters(false)
        .build()
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::warn!(root = %root.display(), "walk error: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_some_and(|ft| ft.is_file()))
        .map(|e| e.into_path())
        .collect();

    files.sort();
    files
}
