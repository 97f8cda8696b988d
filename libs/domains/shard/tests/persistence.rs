use domain_shard::{MemoryEngine, Shard, ShardConfig, ShardHandle};

fn config() -> ShardConfig {
    ShardConfig::new(3, 1 << 20)
}

#[tokio::test]
async fn test_save_then_load_answers_the_same() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.shard");

    let keys: Vec<u64> = (1..=20).collect();
    let vectors: Vec<Vec<f32>> = keys
        .iter()
        .map(|k| vec![*k as f32, (*k as f32).sin(), 1.0])
        .collect();

    let original = ShardHandle::new(Shard::new(config(), MemoryEngine::new(&config()).unwrap()));
    original
        .add_multi(keys.clone(), vectors.clone())
        .await
        .unwrap();
    original.delete(7).await.unwrap();
    original.save(path.clone()).await.unwrap();

    let engine = MemoryEngine::new(&config()).unwrap();
    let loaded = ShardHandle::new(Shard::load(config(), engine, &path).unwrap());

    assert_eq!(
        original.len().await.unwrap(),
        loaded.len().await.unwrap()
    );
    for (key, vector) in keys.iter().zip(&vectors) {
        assert_eq!(original.has(*key).await, loaded.has(*key).await);
        if *key == 7 {
            assert!(loaded.get(*key, 1).await.is_err());
        } else {
            assert_eq!(&loaded.get(*key, 1).await.unwrap(), vector);
        }
    }
}

#[tokio::test]
async fn test_repeated_saves_replace_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("collection.shard");

    let handle = ShardHandle::new(Shard::new(config(), MemoryEngine::new(&config()).unwrap()));
    handle.add(1, vec![1.0, 0.0, 0.0]).await.unwrap();
    handle.save(path.clone()).await.unwrap();
    handle.add(2, vec![0.0, 1.0, 0.0]).await.unwrap();
    handle.save(path.clone()).await.unwrap();

    let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);

    let loaded = Shard::load(config(), MemoryEngine::new(&config()).unwrap(), &path).unwrap();
    assert_eq!(loaded.len().unwrap(), 2);
}
