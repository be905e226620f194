use std::path::Path;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, Result};

/// Blocks per lane for one reader feeding one indexer.
pub const QUEUE_SIZE_RATIO: usize = 2;
pub const BLOCK_SIZE: usize = 1024;
pub const BLOCK_ADDON_SIZE: usize = 4096;
pub const PAGE_SIZE: usize = 4096;
pub const DELIMITERS: &str = " \t\n";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub num_lanes: usize,
    pub queue_size: usize,
    pub block_size: usize,
    pub block_addon: usize,               // Extra bytes a block may grow to finish a token
    pub page_size: usize,
    pub total_capacity: usize,            // TF-IDF budget split evenly across shards
    pub delimiters: String,
    pub numa_nodes: usize,

    pub server_addr: String,
    pub max_query_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_lanes: num_cpus::get().clamp(1, 4),
            queue_size: QUEUE_SIZE_RATIO,
            block_size: BLOCK_SIZE,
            block_addon: BLOCK_ADDON_SIZE,
            page_size: PAGE_SIZE,
            total_capacity: 64 * 1024 * 1024,     // 64MB across all shards
            delimiters: DELIMITERS.to_string(),
            numa_nodes: 1,

            server_addr: "127.0.0.1:8080".to_string(),
            max_query_bytes: 1024,
        }
    }
}

impl Config {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_lanes == 0 {
            return Err(Error::invalid_argument("num_lanes must be at least 1"));
        }
        if self.queue_size == 0 {
            return Err(Error::invalid_argument("queue_size must be at least 1"));
        }
        if self.block_size == 0 {
            return Err(Error::invalid_argument("block_size must be at least 1"));
        }
        if self.delimiters.is_empty() {
            return Err(Error::invalid_argument("delimiter set is empty"));
        }
        if self.numa_nodes == 0 {
            return Err(Error::invalid_argument("numa_nodes must be at least 1"));
        }
        Ok(())
    }

    /// Capacity of every block buffer in a lane's pool.
    pub fn block_capacity(&self) -> usize {
        self.block_size + self.block_addon
    }

    /// Memory budget handed to each TF-IDF shard.
    pub fn shard_capacity(&self) -> usize {
        self.total_capacity / self.num_lanes.max(1)
    }
}
