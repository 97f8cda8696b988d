//! Vector index engines.
//!
//! The shard treats the engine as a black box: it only needs insert, remove,
//! lookup and search by key plus capacity, serialized size and persistence.

use std::path::Path;

use crate::error::EngineResult;
use crate::models::{Key, SearchHit, ShardConfig};

pub mod memory;
#[cfg(feature = "usearch")]
pub mod usearch;

pub use memory::MemoryEngine;
#[cfg(feature = "usearch")]
pub use self::usearch::UsearchEngine;

/// Approximate nearest neighbour index over fixed-dimension vectors
///
/// Implementations are synchronous; callers run them on blocking threads.
#[cfg_attr(any(test, feature = "mocks"), mockall::automock)]
pub trait IndexEngine: Send + Sync + 'static {
    /// Make room for at least `capacity` items in total.
    fn reserve(&mut self, capacity: usize) -> EngineResult<()>;

    fn add(&mut self, key: Key, vector: &[f32]) -> EngineResult<()>;

    /// Remove every vector stored under `key`, returning how many were removed.
    fn remove(&mut self, key: Key) -> EngineResult<usize>;

    /// Up to `count` vectors stored under `key`, concatenated.
    ///
    /// An unknown key yields an empty vector.
    fn get(&self, key: Key, count: usize) -> EngineResult<Vec<f32>>;

    fn search(&self, query: &[f32], limit: usize) -> EngineResult<Vec<SearchHit>>;

    /// Number of stored vectors.
    fn len(&self) -> EngineResult<usize>;

    fn capacity(&self) -> EngineResult<usize>;

    /// Bytes the index would occupy once saved.
    fn serialized_length(&self) -> EngineResult<usize>;

    fn save(&self, path: &Path) -> EngineResult<()>;

    /// Replace the in-memory index with the one stored at `path`.
    fn load(&mut self, path: &Path) -> EngineResult<()>;
}

/// Builds engines for a shard configuration
pub trait EngineFactory: Send + Sync + 'static {
    type Engine: IndexEngine;

    fn create(&self, config: &ShardConfig) -> EngineResult<Self::Engine>;
}

/// Factory for [`MemoryEngine`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryEngineFactory;

impl EngineFactory for MemoryEngineFactory {
    type Engine = MemoryEngine;

    fn create(&self, config: &ShardConfig) -> EngineResult<MemoryEngine> {
        MemoryEngine::new(config)
    }
}

/// Factory for [`UsearchEngine`].
#[cfg(feature = "usearch")]
#[derive(Debug, Clone, Copy, Default)]
pub struct UsearchEngineFactory;

#[cfg(feature = "usearch")]
impl EngineFactory for UsearchEngineFactory {
    type Engine = UsearchEngine;

    fn create(&self, config: &ShardConfig) -> EngineResult<UsearchEngine> {
        UsearchEngine::new(config)
    }
}
