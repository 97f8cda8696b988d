//! Periodic persistence of a writable shard.

use std::path::PathBuf;
use std::time::Duration;

use domain_shard::{IndexEngine, ShardError, ShardHandle};
use grpc_client::ShutdownCoordinator;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Save the shard every `interval` until shutdown begins.
///
/// A failed save is logged and retried on the next tick. The task ends early
/// if the shard has been released.
pub fn spawn_auto_sync<E: IndexEngine>(
    handle: ShardHandle<E>,
    path: PathBuf,
    interval: Duration,
    shutdown: ShutdownCoordinator,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval = ?interval, path = %path.display(), "Auto-sync started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    match handle.save(path.clone()).await {
                        Ok(()) => debug!("Auto-sync saved shard"),
                        Err(ShardError::NotInitialized) => break,
                        Err(e) => warn!(error = %e, "Auto-sync failed to save shard"),
                    }
                }
            }
        }

        info!("Auto-sync stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_shard::{MemoryEngine, Shard, ShardConfig};

    fn config() -> ShardConfig {
        ShardConfig::new(2, 1 << 20)
    }

    #[tokio::test]
    async fn test_auto_sync_persists_and_stops() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shard.bin");

        let handle = ShardHandle::new(Shard::new(config(), MemoryEngine::new(&config()).unwrap()));
        handle.add(1, vec![1.0, 2.0]).await.unwrap();

        let shutdown = ShutdownCoordinator::new();
        let task = spawn_auto_sync(
            handle.clone(),
            path.clone(),
            Duration::from_millis(20),
            shutdown.clone(),
        );

        let deadline = Instant::now() + Duration::from_secs(5);
        while !path.exists() && Instant::now() < deadline {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        shutdown.shutdown();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("auto-sync should stop on shutdown")
            .unwrap();

        let loaded = Shard::load(config(), MemoryEngine::new(&config()).unwrap(), &path).unwrap();
        assert!(loaded.has(1));
    }

    #[tokio::test]
    async fn test_auto_sync_ends_when_shard_released() {
        let dir = tempfile::tempdir().unwrap();
        let handle = ShardHandle::new(Shard::new(config(), MemoryEngine::new(&config()).unwrap()));
        handle.release().await;

        let task = spawn_auto_sync(
            handle,
            dir.path().join("shard.bin"),
            Duration::from_millis(10),
            ShutdownCoordinator::new(),
        );

        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .expect("auto-sync should end")
            .unwrap();
    }
}
