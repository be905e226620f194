use std::fmt;
use serde::{Serialize, Deserialize};

/// Identifier of one reader+indexer pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LaneId(pub usize);

impl fmt::Display for LaneId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "lane-{}", self.0)
    }
}

/// Identifier handed out by a lane's file index; only unique within that lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileIdx(pub u64);

