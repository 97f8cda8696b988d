//! Selection of the downstream shard for a request.

use domain_shard::Key;

/// Maps keys onto downstream shards
pub trait PlacementStrategy: Send + Sync + 'static {
    /// Index of the shard owning `key`, in `0..shard_count`.
    fn shard_for_key(&self, key: Key, shard_count: usize) -> usize;

    /// Shard serving key-less operations such as Search, Save or Length.
    fn default_shard(&self) -> usize {
        0
    }
}

/// Sends everything to the first shard
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleShard;

impl PlacementStrategy for SingleShard {
    fn shard_for_key(&self, _key: Key, _shard_count: usize) -> usize {
        0
    }
}
