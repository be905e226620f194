use std::io::Read;
use std::path::{Path, PathBuf};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::{FileReadStats, ReaderStats};
use crate::core::types::{FileIdx, LaneId};
use crate::index::file_index::FileIndex;
use crate::memory::dual_queue::{CloseOnPanic, DualQueue};
use crate::memory::registry::MemoryComponentRegistry;
use crate::reader::driver::{FileReaderDriver, ReadOptions};

/// What happened to one input file
#[derive(Debug)]
pub enum ReadOutcome {
    Indexed { file_idx: FileIdx, stats: FileReadStats },
    /// The file could not be opened; nothing was registered or enqueued.
    Skipped { error: Error },
}

/// Stream one file through `lane`.
pub fn read_file(
    registry: &MemoryComponentRegistry,
    lane: LaneId,
    path: &Path,
    options: &ReadOptions,
) -> Result<ReadOutcome> {
    let queue = registry.dual_queue(lane)?;
    let file_index = registry.file_index(lane)?;
    stream_file(queue, file_index, path, options)
}

/// Open `path`, register it, and pump its blocks into `queue`.
///
/// An open failure is reported as [`ReadOutcome::Skipped`]. An `Err` means
/// the file failed mid-read; its held block has already been recycled as an
/// end-of-file marker. A closed queue fails with `InvalidState` before the
/// file is opened.
pub fn stream_file(
    queue: &DualQueue,
    file_index: &FileIndex,
    path: &Path,
    options: &ReadOptions,
) -> Result<ReadOutcome> {
    if queue.is_closed() {
        return Err(lane_closed(path));
    }

    let mut reader = match FileReaderDriver::open(path, options.clone()) {
        Ok(reader) => reader,
        Err(error) => return Ok(ReadOutcome::Skipped { error }),
    };

    let file_idx = file_index.insert(path);
    let result = pump(queue, &mut reader, file_idx);
    let bytes = reader.close();
    tracing::trace!(file = %path.display(), bytes, "file closed");

    result.map(|stats| ReadOutcome::Indexed { file_idx, stats })
}

/// Move a reader's blocks into the full pool, ending with a zero-length block.
pub fn pump<R: Read>(
    queue: &DualQueue,
    reader: &mut FileReaderDriver<R>,
    file_idx: FileIdx,
) -> Result<FileReadStats> {
    let mut stats = FileReadStats::default();

    loop {
        let Some(mut block) = queue.pop_empty() else {
            return Err(lane_closed(reader.path()));
        };
        block.file_idx = file_idx;

        if let Err(e) = reader.read_next_block(&mut block) {
            // Hand the block back as end of file so the indexer still sees the file close
            block.mark_end_of_file(file_idx);
            queue.push_full(block);
            stats.blocks += 1;
            return Err(e);
        }

        let length = block.length;
        if length > 0 {
            stats.bytes += length as u64;
        }
        stats.blocks += 1;
        queue.push_full(block);

        if length == 0 {
            break;
        }
    }

    Ok(stats)
}

fn lane_closed(path: &Path) -> Error {
    Error::new(
        ErrorKind::InvalidState,
        format!("lane closed while reading {}", path.display()),
    )
}

/// Reader worker body: stream every assigned file through one lane in order.
pub fn run_reader_lane(
    registry: &MemoryComponentRegistry,
    lane: LaneId,
    files: &[PathBuf],
    options: &ReadOptions,
) -> Result<ReaderStats> {
    let queue = registry.dual_queue(lane)?;
    let file_index = registry.file_index(lane)?;
    let mut stats = ReaderStats::default();
    let _guard = CloseOnPanic(queue);

    tracing::debug!(%lane, files = files.len(), "reader started");

    for path in files {
        if queue.is_closed() {
            tracing::warn!(%lane, remaining = files.len() - stats.files_seen(), "lane closed, reader stopping");
            break;
        }
        match stream_file(queue, file_index, path, options) {
            Ok(ReadOutcome::Indexed { file_idx, stats: file_stats }) => {
                tracing::debug!(
                    %lane,
                    file = %path.display(),
                    file_idx = file_idx.0,
                    bytes = file_stats.bytes,
                    "file streamed"
                );
                stats.absorb(&file_stats);
            }
            Ok(ReadOutcome::Skipped { error }) => {
                tracing::warn!(%lane, file = %path.display(), "skipping file: {}", error);
                stats.files_skipped += 1;
            }
            Err(error) => {
                tracing::warn!(%lane, file = %path.display(), "read failed: {}", error);
                stats.files_failed += 1;
            }
        }
    }

    tracing::debug!(
        %lane,
        indexed = stats.files_indexed,
        skipped = stats.files_skipped,
        "reader finished"
    );
    Ok(stats)
}
