use std::thread;
use parking_lot::RwLock;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::core::types::LaneId;
use crate::index::file_index::FileIndex;
use crate::index::tfidf::TfIdfIndex;
use crate::memory::dual_queue::DualQueue;
use crate::memory::registry::{MemoryComponent, MemoryComponentRegistry, RegistryBuilder};

/// Build and register a lane's queue and its file index.
pub fn init_queue_lane(
    builder: &RegistryBuilder,
    lane: LaneId,
    numa_node: usize,
    queue_size: usize,
    block_capacity: usize,
) -> Result<()> {
    let queue = DualQueue::new(queue_size, block_capacity);
    builder.register(lane, numa_node, MemoryComponent::DualQueue(queue))?;
    builder.register(lane, numa_node, MemoryComponent::FileIndex(FileIndex::new()))?;
    Ok(())
}

/// Build and register a lane's TF-IDF shard sized from `capacity` bytes.
pub fn init_index_shard(
    builder: &RegistryBuilder,
    lane: LaneId,
    numa_node: usize,
    capacity: usize,
    page_size: usize,
) -> Result<()> {
    let index = TfIdfIndex::with_capacity_budget(capacity, page_size);
    tracing::debug!(%lane, capacity, buckets = index.num_buckets(), "created tf-idf shard");
    builder.register(lane, numa_node, MemoryComponent::TfIdfIndex(RwLock::new(index)))
}

/// NUMA node a lane's components are placed on.
pub fn numa_node_for(lane: LaneId, config: &Config) -> usize {
    lane.0 % config.numa_nodes.max(1)
}

/// Run every lane's init workers concurrently and wait for all of them.
///
/// Returning is the barrier after which registry lookups always succeed.
pub fn build_registry(config: &Config) -> Result<MemoryComponentRegistry> {
    let builder = RegistryBuilder::new();
    let block_capacity = config.block_capacity();
    let shard_capacity = config.shard_capacity();

    let results: Vec<thread::Result<Result<()>>> = thread::scope(|s| {
        let mut handles = Vec::with_capacity(config.num_lanes * 2);

        for id in 0..config.num_lanes {
            let lane = LaneId(id);
            let node = numa_node_for(lane, config);
            let builder = &builder;
            handles.push(s.spawn(move || {
                init_queue_lane(builder, lane, node, config.queue_size, block_capacity)
            }));
        }
        for id in 0..config.num_lanes {
            let lane = LaneId(id);
            let node = numa_node_for(lane, config);
            let builder = &builder;
            handles.push(s.spawn(move || {
                init_index_shard(builder, lane, node, shard_capacity, config.page_size)
            }));
        }

        handles.into_iter().map(|h| h.join()).collect()
    });

    for result in results {
        match result {
            Ok(outcome) => outcome?,
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }

    tracing::info!(
        lanes = config.num_lanes,
        components = builder.len(),
        "memory components initialized"
    );
    Ok(builder.seal())
}
