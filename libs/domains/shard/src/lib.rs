//! Shard Domain Library
//!
//! A shard is one capacity-bounded collection of `(key, vector)` pairs backed
//! by an approximate nearest neighbour index. It tracks when its serialized
//! footprint reaches the configured budget and can be persisted to a file.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   ShardHandle   │  ← RwLock, blocking pool, release
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐     ┌──────────────────┐
//! │    Shard<E>     │     │ RequestValidator │
//! │ (capacity gate) │     └──────────────────┘
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │  IndexEngine    │
//! │   (trait)       │
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐
//! │ UsearchEngine   │
//! │ MemoryEngine    │
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_shard::{MemoryEngine, Shard, ShardConfig, ShardHandle};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ShardConfig::new(4, 1024 * 1024);
//! let engine = MemoryEngine::new(&config)?;
//! let handle = ShardHandle::new(Shard::new(config, engine));
//!
//! let outcome = handle
//!     .add_multi(vec![1, 2], vec![vec![0.0; 4], vec![1.0; 4]])
//!     .await?;
//! assert_eq!(outcome.inserted, 2);
//!
//! let hits = handle.search(vec![1.0; 4], 1).await?;
//! assert_eq!(hits[0].key, 2);
//! # Ok(())
//! # }
//! ```

pub mod conversions;
pub mod engine;
pub mod error;
pub mod handle;
pub mod models;
pub mod shard;
pub mod validation;

// Re-export commonly used types
#[cfg(feature = "usearch")]
pub use engine::{UsearchEngine, UsearchEngineFactory};
pub use engine::{EngineFactory, IndexEngine, MemoryEngine, MemoryEngineFactory};
pub use error::{BatchInsertError, EngineError, EngineResult, ShardError, ShardResult};
pub use handle::ShardHandle;
pub use models::{AddOutcome, Key, Metric, Quantization, SearchHit, ShardConfig};
pub use shard::Shard;
pub use validation::RequestValidator;
