use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::Instant;
use chrono::Utc;
use crate::analysis::tokenizer::{BlockTokenizer, DelimiterTokenizer};
use crate::core::config::Config;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::{IndexerStats, LaneReport, PipelineReport, ReaderStats};
use crate::core::types::LaneId;
use crate::index::view::IndexView;
use crate::memory::dual_queue::DualQueue;
use crate::memory::registry::{ComponentKind, MemoryComponentRegistry};
use crate::parallel::indexer_worker::run_indexer;
use crate::parallel::init::{build_registry, numa_node_for};
use crate::parallel::reader_worker::run_reader_lane;
use crate::reader::driver::ReadOptions;

/// Owns the lanes and drives reader/indexer workers over a corpus.
///
/// Construction runs the lane init workers; `run` then starts one reader and
/// one indexer thread per lane, streams the files, shuts every lane down with
/// a sentinel block and reports.
pub struct Pipeline {
    config: Config,
    registry: MemoryComponentRegistry,
    tokenizer: Box<dyn BlockTokenizer>,
    total_terms: AtomicUsize,
    has_run: bool,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let tokenizer = DelimiterTokenizer::new(config.delimiters.as_bytes());
        Pipeline::with_tokenizer(config, Box::new(tokenizer))
    }

    pub fn with_tokenizer(config: Config, tokenizer: Box<dyn BlockTokenizer>) -> Result<Self> {
        config.validate()?;
        let registry = build_registry(&config).map_err(fatal_if_registry_misuse)?;

        Ok(Pipeline {
            config,
            registry,
            tokenizer,
            total_terms: AtomicUsize::new(0),
            has_run: false,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &MemoryComponentRegistry {
        &self.registry
    }

    pub fn lanes(&self) -> Vec<LaneId> {
        self.registry.lanes(ComponentKind::DualQueue)
    }

    /// The tokenizer every indexer runs; queries should split the same way.
    pub fn tokenizer(&self) -> &dyn BlockTokenizer {
        self.tokenizer.as_ref()
    }

    /// Read-only lookup across every shard.
    pub fn view(&self) -> IndexView<'_> {
        IndexView::new(&self.registry)
    }

    /// Term count accumulated by `run`.
    pub fn total_terms(&self) -> usize {
        self.total_terms.load(Ordering::SeqCst)
    }

    /// Index `files` and block until every lane has shut down.
    ///
    /// A pipeline runs once: shards and file indexes are never reset, so a
    /// second call fails with `InvalidState`. If a worker panics, its lane is
    /// closed so the peer exits and the panic is resumed here.
    pub fn run(&mut self, files: &[PathBuf]) -> Result<PipelineReport> {
        if self.has_run {
            return Err(Error::new(
                ErrorKind::InvalidState,
                "pipeline has already run; build a new one to index again".to_string(),
            ));
        }
        self.has_run = true;

        let started_at = Utc::now();
        let timer = Instant::now();

        let lanes = self.lanes();
        let assignments = assign_round_robin(files, lanes.len());
        let options = ReadOptions::from_config(&self.config);
        let block_size = self.config.block_size;

        tracing::info!(lanes = lanes.len(), files = files.len(), "pipeline started");

        let registry = &self.registry;
        let total_terms = &self.total_terms;
        let tokenizer = &self.tokenizer;

        let (reader_results, indexer_results) = thread::scope(|s| {
            let indexers: Vec<_> = lanes
                .iter()
                .map(|&lane| {
                    let tokenizer = tokenizer.clone_box();
                    s.spawn(move || {
                        run_indexer(registry, lane, lane, tokenizer.as_ref(), block_size, total_terms)
                    })
                })
                .collect();

            let readers: Vec<_> = lanes
                .iter()
                .zip(assignments.iter())
                .map(|(&lane, files)| {
                    let options = &options;
                    s.spawn(move || run_reader_lane(registry, lane, files, options))
                })
                .collect();

            let reader_results: Vec<_> = readers.into_iter().map(|h| h.join()).collect();

            // Readers are done; lanes closed by a dead worker are skipped
            for &lane in &lanes {
                if let Ok(queue) = registry.dual_queue(lane) {
                    shutdown_lane(queue);
                }
            }

            let indexer_results: Vec<_> = indexers.into_iter().map(|h| h.join()).collect();
            (reader_results, indexer_results)
        });

        let mut report = PipelineReport {
            started_at,
            elapsed_ms: 0,
            files_indexed: 0,
            files_skipped: 0,
            files_failed: 0,
            bytes_read: 0,
            blocks_processed: 0,
            total_terms: 0,
            lanes: Vec::with_capacity(lanes.len()),
        };

        for ((&lane, reader), indexer) in lanes.iter().zip(reader_results).zip(indexer_results) {
            // Indexer first: a reader that stopped on a closed lane is only a symptom
            let indexer = settle::<IndexerStats>(indexer)?;
            let reader = settle::<ReaderStats>(reader)?;

            report.files_indexed += reader.files_indexed;
            report.files_skipped += reader.files_skipped;
            report.files_failed += reader.files_failed;
            report.bytes_read += reader.bytes_read;
            report.blocks_processed += indexer.blocks_processed;

            report.lanes.push(LaneReport {
                lane,
                numa_node: numa_node_for(lane, &self.config),
                reader,
                indexer,
            });
        }

        // Every indexer has exited, so the accumulator is final
        report.total_terms = self.total_terms.load(Ordering::SeqCst);
        report.elapsed_ms = timer.elapsed().as_millis() as u64;

        tracing::info!(
            files = report.files_indexed,
            skipped = report.files_skipped,
            terms = report.total_terms,
            elapsed_ms = report.elapsed_ms,
            "pipeline finished"
        );
        Ok(report)
    }
}

/// File `i` goes to lane `i % lanes`.
pub fn assign_round_robin(files: &[PathBuf], lanes: usize) -> Vec<Vec<PathBuf>> {
    let mut assignments = vec![Vec::new(); lanes];
    if lanes == 0 {
        return assignments;
    }
    for (i, path) in files.iter().enumerate() {
        assignments[i % lanes].push(path.clone());
    }
    assignments
}

/// Push the shutdown sentinel into a lane's full pool. No-op on a closed lane.
pub fn shutdown_lane(queue: &DualQueue) {
    match queue.pop_empty() {
        Some(mut block) => {
            block.mark_shutdown();
            queue.push_full(block);
        }
        None => tracing::debug!("lane already closed, no sentinel sent"),
    }
}

fn settle<T>(joined: thread::Result<Result<T>>) -> Result<T> {
    match joined {
        Ok(result) => result.map_err(fatal_if_registry_misuse),
        Err(payload) => std::panic::resume_unwind(payload),
    }
}

/// Registry misuse can only come from broken orchestration.
fn fatal_if_registry_misuse(err: Error) -> Error {
    match err.kind {
        ErrorKind::NotFound | ErrorKind::AlreadyExists => {
            tracing::error!("memory component registry misuse: {}", err);
            panic!("memory component registry misuse: {}", err);
        }
        _ => err,
    }
}
