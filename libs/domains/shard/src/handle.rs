//! Shared, lock-protected access to a shard.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::engine::IndexEngine;
use crate::error::{ShardError, ShardResult};
use crate::models::{AddOutcome, Key, SearchHit};
use crate::shard::Shard;

/// Reader/writer access to a shard from async request handlers
///
/// Queries share the read lock; inserts, deletes and saves take the write
/// lock, which keeps the capacity accounting of a bulk insert atomic and
/// serialises saves. Engine work runs on the blocking pool while the owned
/// guard is held.
pub struct ShardHandle<E> {
    inner: Arc<RwLock<Option<Shard<E>>>>,
}

impl<E> Clone for ShardHandle<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: IndexEngine> ShardHandle<E> {
    pub fn new(shard: Shard<E>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(shard))),
        }
    }

    async fn read<T, F>(&self, f: F) -> ShardResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Shard<E>) -> ShardResult<T> + Send + 'static,
    {
        let guard = Arc::clone(&self.inner).read_owned().await;
        tokio::task::spawn_blocking(move || match guard.as_ref() {
            Some(shard) => f(shard),
            None => Err(ShardError::NotInitialized),
        })
        .await?
    }

    async fn write<T, F>(&self, f: F) -> ShardResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Shard<E>) -> ShardResult<T> + Send + 'static,
    {
        let mut guard = Arc::clone(&self.inner).write_owned().await;
        tokio::task::spawn_blocking(move || match guard.as_mut() {
            Some(shard) => f(shard),
            None => Err(ShardError::NotInitialized),
        })
        .await?
    }

    pub async fn search(&self, query: Vec<f32>, limit: usize) -> ShardResult<Vec<SearchHit>> {
        self.read(move |shard| shard.search(&query, limit)).await
    }

    pub async fn add(&self, key: Key, vector: Vec<f32>) -> ShardResult<AddOutcome> {
        self.write(move |shard| shard.add(key, &vector)).await
    }

    pub async fn add_multi(
        &self,
        keys: Vec<Key>,
        vectors: Vec<Vec<f32>>,
    ) -> ShardResult<AddOutcome> {
        self.write(move |shard| shard.add_multi(&keys, &vectors))
            .await
    }

    pub async fn get(&self, key: Key, count: usize) -> ShardResult<Vec<f32>> {
        self.read(move |shard| shard.get(key, count)).await
    }

    /// Never fails: a released shard or a lookup error reads as absent.
    pub async fn has(&self, key: Key) -> bool {
        self.read(move |shard| Ok(shard.has(key)))
            .await
            .unwrap_or(false)
    }

    pub async fn delete(&self, key: Key) -> ShardResult<()> {
        self.write(move |shard| shard.delete(key)).await
    }

    /// Persist under the write lock, after every in-flight mutation.
    pub async fn save(&self, path: PathBuf) -> ShardResult<()> {
        self.write(move |shard| shard.save(&path)).await
    }

    pub async fn len(&self) -> ShardResult<u64> {
        self.read(|shard| shard.len()).await
    }

    pub async fn capacity(&self) -> ShardResult<u64> {
        self.read(|shard| shard.capacity()).await
    }

    pub async fn size(&self) -> ShardResult<u64> {
        self.read(|shard| shard.size()).await
    }

    pub async fn is_full(&self) -> ShardResult<bool> {
        self.read(|shard| Ok(shard.is_full())).await
    }

    /// Destroy the shard. Later calls fail with [`ShardError::NotInitialized`].
    ///
    /// Returns false if the shard had already been released.
    pub async fn release(&self) -> bool {
        let shard = self.inner.write().await.take();
        match shard {
            Some(shard) => {
                shard.destroy();
                info!("Shard released");
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use crate::models::ShardConfig;

    fn handle(max_size_bytes: u64) -> ShardHandle<MemoryEngine> {
        let config = ShardConfig::new(2, max_size_bytes);
        let engine = MemoryEngine::new(&config).unwrap();
        ShardHandle::new(Shard::new(config, engine))
    }

    #[tokio::test]
    async fn test_operations_after_release_are_not_initialized() {
        let handle = handle(1 << 20);
        handle.add(1, vec![1.0, 2.0]).await.unwrap();

        assert!(handle.release().await);
        assert!(!handle.release().await);

        assert!(matches!(
            handle.len().await,
            Err(ShardError::NotInitialized)
        ));
        assert!(matches!(
            handle.add(2, vec![1.0, 2.0]).await,
            Err(ShardError::NotInitialized)
        ));
        assert!(!handle.has(1).await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_batches_respect_budget() {
        let probe = MemoryEngine::new(&ShardConfig::new(2, 1)).unwrap();
        let budget = probe.estimated_length(10) as u64;
        let handle = handle(budget);

        let mut tasks = Vec::new();
        for batch in 0..8u64 {
            let handle = handle.clone();
            tasks.push(tokio::spawn(async move {
                let keys: Vec<Key> = (0..5).map(|i| batch * 100 + i).collect();
                let vectors = keys.iter().map(|k| vec![*k as f32, 0.0]).collect();
                handle.add_multi(keys, vectors).await.unwrap()
            }));
        }

        let mut inserted = 0;
        for task in tasks {
            inserted += task.await.unwrap().inserted;
        }

        assert_eq!(inserted, 10);
        assert_eq!(handle.len().await.unwrap(), 10);
        assert!(handle.is_full().await.unwrap());
    }
}
