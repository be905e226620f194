pub mod block;
pub mod dual_queue;
pub mod registry;
