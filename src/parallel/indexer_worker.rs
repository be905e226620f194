use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::RwLock;
use crate::analysis::tokenizer::{BlockTokenizer, TokenScratch};
use crate::core::error::Result;
use crate::core::stats::IndexerStats;
use crate::core::types::LaneId;
use crate::index::tfidf::TfIdfIndex;
use crate::memory::dual_queue::{CloseOnPanic, DualQueue};
use crate::memory::registry::MemoryComponentRegistry;

/// Indexer worker body.
///
/// Drains the queue of `queue_lane` into the shard of `shard_lane` until the
/// shutdown sentinel arrives, then adds the shard's term count to
/// `total_terms`.
pub fn run_indexer(
    registry: &MemoryComponentRegistry,
    queue_lane: LaneId,
    shard_lane: LaneId,
    tokenizer: &dyn BlockTokenizer,
    block_size: usize,
    total_terms: &AtomicUsize,
) -> Result<IndexerStats> {
    let queue = registry.dual_queue(queue_lane)?;
    let shard = registry.tfidf_index(shard_lane)?;
    let _guard = CloseOnPanic(queue);

    tracing::debug!(lane = %queue_lane, shard = %shard_lane, tokenizer = tokenizer.name(), "indexer started");
    let stats = drain(queue, shard, tokenizer, block_size);
    total_terms.fetch_add(stats.num_terms, Ordering::SeqCst);

    tracing::debug!(
        lane = %queue_lane,
        blocks = stats.blocks_processed,
        terms = stats.num_terms,
        "indexer finished"
    );
    Ok(stats)
}

/// Tokenize and index blocks until the shutdown sentinel has been recycled,
/// or until the queue is closed because the reader died.
///
/// Every popped block goes back to the empty pool, markers included.
pub fn drain(
    queue: &DualQueue,
    shard: &RwLock<TfIdfIndex>,
    tokenizer: &dyn BlockTokenizer,
    block_size: usize,
) -> IndexerStats {
    let mut scratch = TokenScratch::for_block_size(block_size);
    let mut stats = IndexerStats::default();

    loop {
        let Some(block) = queue.pop_full() else {
            tracing::warn!("queue closed before the shutdown sentinel arrived");
            break;
        };
        let shutdown = block.is_shutdown();
        stats.blocks_processed += 1;

        if block.has_data() {
            let count = tokenizer.tokenize_block(&block, &mut scratch);
            let mut index = shard.write();
            for token in scratch.tokens(block.data()) {
                index.insert(token, block.file_idx);
            }
            stats.blocks_tokenized += 1;
            stats.tokens_inserted += count as u64;
        } else if block.is_end_of_file() {
            stats.end_of_file_markers += 1;
        }

        queue.push_empty(block);

        if shutdown {
            break;
        }
    }

    stats.num_terms = shard.read().num_terms();
    stats
}
