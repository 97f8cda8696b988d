use std::path::{Path, PathBuf};

use bytesize::ByteSize;
use tracing::{debug, info, warn};

use crate::engine::IndexEngine;
use crate::error::{BatchInsertError, EngineError, ShardError, ShardResult};
use crate::models::{AddOutcome, Key, SearchHit, ShardConfig};

/// One capacity-bounded collection wrapping a single index engine
///
/// Once the serialized index reaches `max_size_bytes` the shard is full and
/// stays full: later inserts succeed without storing anything.
pub struct Shard<E> {
    config: ShardConfig,
    engine: E,
    is_full: bool,
}

impl<E: IndexEngine> Shard<E> {
    /// Wrap an empty engine.
    pub fn new(config: ShardConfig, engine: E) -> Self {
        Self {
            config,
            engine,
            is_full: false,
        }
    }

    /// Load a persisted index into `engine` and check it against the size budget.
    pub fn load(config: ShardConfig, mut engine: E, path: &Path) -> ShardResult<Self> {
        engine
            .load(path)
            .map_err(|e| ShardError::engine("load", e))?;

        let mut shard = Self::new(config, engine);
        let size = shard.size()?;
        if size >= shard.config.max_size_bytes {
            warn!(
                path = %path.display(),
                size = %ByteSize::b(size),
                max_size = %ByteSize::b(shard.config.max_size_bytes),
                "Loaded shard is already full"
            );
            shard.is_full = true;
        }
        Ok(shard)
    }

    pub fn config(&self) -> &ShardConfig {
        &self.config
    }

    pub fn is_full(&self) -> bool {
        self.is_full
    }

    /// Serialized footprint of the index in bytes.
    pub fn size(&self) -> ShardResult<u64> {
        self.engine
            .serialized_length()
            .map(|size| size as u64)
            .map_err(|e| ShardError::engine("size", e))
    }

    pub fn len(&self) -> ShardResult<u64> {
        self.engine
            .len()
            .map(|len| len as u64)
            .map_err(|e| ShardError::engine("length", e))
    }

    pub fn capacity(&self) -> ShardResult<u64> {
        self.engine
            .capacity()
            .map(|capacity| capacity as u64)
            .map_err(|e| ShardError::engine("capacity", e))
    }

    pub fn add(&mut self, key: Key, vector: &[f32]) -> ShardResult<AddOutcome> {
        self.add_multi(&[key], &[vector])
    }

    /// Insert a batch in order, stopping as soon as the shard becomes full.
    ///
    /// Reaching the size budget mid-batch is a success: the remaining items are
    /// neither attempted nor counted. An engine failure aborts the batch and
    /// reports how many items were committed before it.
    pub fn add_multi<V: AsRef<[f32]>>(
        &mut self,
        keys: &[Key],
        vectors: &[V],
    ) -> ShardResult<AddOutcome> {
        if keys.len() != vectors.len() {
            return Err(ShardError::Validation(
                "keys and vectors must have the same length".to_string(),
            ));
        }

        let current = self
            .engine
            .len()
            .map_err(|e| BatchInsertError::new("add_multi", 0, self.is_full, e))?;
        self.engine
            .reserve(current + keys.len())
            .map_err(|e| BatchInsertError::new("add_multi", 0, self.is_full, e))?;

        if self.is_full {
            debug!(requested = keys.len(), "Shard is full, skipping insert");
            return Ok(AddOutcome::full());
        }

        let initial_size = self
            .engine
            .serialized_length()
            .map_err(|e| BatchInsertError::new("add_multi", 0, false, e))?;
        let mut final_size = initial_size;
        let mut inserted = 0u64;

        for (key, vector) in keys.iter().zip(vectors) {
            self.engine
                .add(*key, vector.as_ref())
                .map_err(|e| self.batch_failure(inserted, e))?;
            inserted += 1;

            final_size = self
                .engine
                .serialized_length()
                .map_err(|e| self.batch_failure(inserted, e))?;

            if final_size != initial_size && final_size as u64 >= self.config.max_size_bytes {
                self.is_full = true;
                break;
            }
        }

        info!(
            inserted,
            requested = keys.len(),
            size = %ByteSize::b(final_size as u64),
            is_full = self.is_full,
            "Added vectors to shard"
        );

        Ok(AddOutcome {
            inserted,
            is_full: self.is_full,
        })
    }

    fn batch_failure(&self, inserted: u64, source: EngineError) -> ShardError {
        warn!(inserted, error = %source, "Batch insert aborted");
        BatchInsertError::new("add_multi", inserted, self.is_full, source).into()
    }

    pub fn search(&self, query: &[f32], limit: usize) -> ShardResult<Vec<SearchHit>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.engine
            .search(query, limit)
            .map_err(|e| ShardError::engine("search", e))
    }

    /// Up to `count` vectors stored under `key`, concatenated.
    pub fn get(&self, key: Key, count: usize) -> ShardResult<Vec<f32>> {
        let values = self
            .engine
            .get(key, count)
            .map_err(|e| ShardError::engine("get", e))?;
        if values.is_empty() {
            return Err(ShardError::NotFound(key));
        }
        Ok(values)
    }

    /// Any lookup failure counts as absent.
    pub fn has(&self, key: Key) -> bool {
        self.get(key, 1).is_ok()
    }

    pub fn delete(&mut self, key: Key) -> ShardResult<()> {
        let removed = self
            .engine
            .remove(key)
            .map_err(|e| ShardError::engine("delete", e))?;
        if removed == 0 {
            return Err(ShardError::NotFound(key));
        }
        Ok(())
    }

    /// Persist the index to `path`.
    ///
    /// The engine writes a sibling temporary file which is then renamed over
    /// `path`, so readers never observe a partially written shard.
    pub fn save(&self, path: &Path) -> ShardResult<()> {
        let tmp = temporary_path(path);

        let written = self
            .engine
            .save(&tmp)
            .and_then(|_| std::fs::rename(&tmp, path).map_err(EngineError::from));

        if let Err(e) = written {
            let _ = std::fs::remove_file(&tmp);
            return Err(ShardError::engine("save", e));
        }

        info!(
            path = %path.display(),
            size = %ByteSize::b(self.size().unwrap_or_default()),
            "Saved shard"
        );
        Ok(())
    }

    /// Release the engine.
    pub fn destroy(self) {
        debug!("Releasing shard engine");
        drop(self.engine);
    }
}

fn temporary_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "shard".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}
