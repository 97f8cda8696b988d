//! USearch HNSW engine.

use std::path::Path;

use usearch::{Index, IndexOptions, MetricKind, ScalarKind};

use super::IndexEngine;
use crate::error::{EngineError, EngineResult};
use crate::models::{Key, Metric, Quantization, SearchHit, ShardConfig};

fn metric_kind(metric: Metric) -> MetricKind {
    match metric {
        Metric::InnerProduct => MetricKind::IP,
        Metric::Cosine => MetricKind::Cos,
        Metric::L2Squared => MetricKind::L2sq,
        Metric::Haversine => MetricKind::Haversine,
        Metric::Divergence => MetricKind::Divergence,
        Metric::Pearson => MetricKind::Pearson,
        Metric::Hamming => MetricKind::Hamming,
        Metric::Tanimoto => MetricKind::Tanimoto,
        Metric::Sorensen => MetricKind::Sorensen,
    }
}

fn scalar_kind(quantization: Quantization) -> ScalarKind {
    match quantization {
        Quantization::F32 => ScalarKind::F32,
        Quantization::BF16 => ScalarKind::BF16,
        Quantization::F16 => ScalarKind::F16,
        Quantization::F64 => ScalarKind::F64,
        Quantization::I8 => ScalarKind::I8,
        Quantization::B1 => ScalarKind::B1,
    }
}

fn index_err(context: &str, err: impl std::fmt::Display) -> EngineError {
    EngineError::Index(format!("{}: {}", context, err))
}

fn path_str(path: &Path) -> EngineResult<&str> {
    path.to_str()
        .ok_or_else(|| EngineError::Index(format!("path is not valid UTF-8: {}", path.display())))
}

pub struct UsearchEngine {
    index: Index,
    dimensions: usize,
}

impl UsearchEngine {
    pub fn new(config: &ShardConfig) -> EngineResult<Self> {
        let options = IndexOptions {
            dimensions: config.dimensions,
            metric: metric_kind(config.metric),
            quantization: scalar_kind(config.quantization),
            connectivity: config.connectivity,
            expansion_add: config.expansion_add,
            expansion_search: config.expansion_search,
            multi: config.multi,
            ..Default::default()
        };

        let index = Index::new(&options).map_err(|e| index_err("failed to create index", e))?;

        Ok(Self {
            index,
            dimensions: config.dimensions,
        })
    }

    fn check_dimensions(&self, vector: &[f32]) -> EngineResult<()> {
        if vector.len() != self.dimensions {
            return Err(EngineError::DimensionMismatch {
                expected: self.dimensions,
                actual: vector.len(),
            });
        }
        Ok(())
    }
}

impl IndexEngine for UsearchEngine {
    fn reserve(&mut self, capacity: usize) -> EngineResult<()> {
        self.index
            .reserve(capacity)
            .map_err(|e| index_err("failed to reserve capacity", e))
    }

    fn add(&mut self, key: Key, vector: &[f32]) -> EngineResult<()> {
        self.check_dimensions(vector)?;
        self.index
            .add(key, vector)
            .map_err(|e| index_err(&format!("failed to add vector {}", key), e))
    }

    fn remove(&mut self, key: Key) -> EngineResult<usize> {
        self.index
            .remove(key)
            .map_err(|e| index_err(&format!("failed to remove vector {}", key), e))
    }

    fn get(&self, key: Key, count: usize) -> EngineResult<Vec<f32>> {
        // Never size the buffer beyond what the key actually holds
        let stored = self.index.count(key).min(count);
        if stored == 0 {
            return Ok(Vec::new());
        }

        let mut buffer = vec![0.0f32; self.dimensions * stored];
        let found = self
            .index
            .get(key, &mut buffer)
            .map_err(|e| index_err(&format!("failed to get vector {}", key), e))?;
        buffer.truncate(found.min(stored) * self.dimensions);
        Ok(buffer)
    }

    fn search(&self, query: &[f32], limit: usize) -> EngineResult<Vec<SearchHit>> {
        self.check_dimensions(query)?;
        let limit = limit.min(self.index.size());
        if limit == 0 {
            return Ok(Vec::new());
        }
        let matches = self
            .index
            .search(query, limit)
            .map_err(|e| index_err("search failed", e))?;

        Ok(matches
            .keys
            .iter()
            .zip(matches.distances.iter())
            .map(|(key, distance)| SearchHit::new(*key, *distance))
            .collect())
    }

    fn len(&self) -> EngineResult<usize> {
        Ok(self.index.size())
    }

    fn capacity(&self) -> EngineResult<usize> {
        Ok(self.index.capacity())
    }

    fn serialized_length(&self) -> EngineResult<usize> {
        Ok(self.index.serialized_length())
    }

    fn save(&self, path: &Path) -> EngineResult<()> {
        self.index
            .save(path_str(path)?)
            .map_err(|e| index_err("failed to save index", e))
    }

    fn load(&mut self, path: &Path) -> EngineResult<()> {
        self.index
            .load(path_str(path)?)
            .map_err(|e| index_err("failed to load index", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AddOutcome;
    use crate::shard::Shard;

    fn engine(dimensions: usize) -> UsearchEngine {
        let config = ShardConfig::new(dimensions, 1 << 20).with_metric(Metric::L2Squared);
        UsearchEngine::new(&config).unwrap()
    }

    #[test]
    fn test_add_get_remove() {
        let mut engine = engine(4);
        engine.reserve(8).unwrap();
        engine.add(1, &[1.0, 0.0, 0.0, 0.0]).unwrap();

        assert_eq!(engine.len().unwrap(), 1);
        assert_eq!(engine.get(1, 1).unwrap(), vec![1.0, 0.0, 0.0, 0.0]);
        assert!(engine.get(2, 1).unwrap().is_empty());

        assert_eq!(engine.remove(1).unwrap(), 1);
        assert!(engine.get(1, 1).unwrap().is_empty());
    }

    #[test]
    fn test_search_returns_nearest_first() {
        let mut engine = engine(2);
        engine.reserve(4).unwrap();
        engine.add(10, &[0.0, 0.0]).unwrap();
        engine.add(20, &[5.0, 5.0]).unwrap();

        let hits = engine.search(&[0.1, 0.1], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].key, 10);
        assert!(hits[0].distance <= hits[1].distance);
    }

    #[test]
    fn test_huge_count_and_limit_are_bounded_by_contents() {
        let mut engine = engine(4);
        engine.reserve(2).unwrap();
        engine.add(1, &[1.0, 0.0, 0.0, 0.0]).unwrap();

        let values = engine.get(1, (i64::MAX / 8) as usize).unwrap();
        assert_eq!(values, vec![1.0, 0.0, 0.0, 0.0]);
        assert!(engine.get(2, usize::MAX).unwrap().is_empty());

        let hits = engine.search(&[1.0, 0.0, 0.0, 0.0], u32::MAX as usize).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, 1);
    }

    #[test]
    fn test_shard_stops_when_index_reaches_budget() {
        let dims = 4;
        let config = |max| ShardConfig::new(dims, max).with_metric(Metric::L2Squared);
        let vectors: Vec<Vec<f32>> = (0..10).map(|i| vec![i as f32, 1.0, 0.0, 0.0]).collect();
        let keys: Vec<Key> = (1..=10).collect();

        // Footprint of an index that reserved room for the whole batch and holds two vectors
        let mut probe = UsearchEngine::new(&config(1)).unwrap();
        probe.reserve(keys.len()).unwrap();
        probe.add(keys[0], &vectors[0]).unwrap();
        probe.add(keys[1], &vectors[1]).unwrap();
        let budget = probe.serialized_length().unwrap() as u64;

        let engine = UsearchEngine::new(&config(budget)).unwrap();
        let mut shard = Shard::new(config(budget), engine);

        let outcome = shard.add_multi(&keys, &vectors).unwrap();
        assert!(outcome.is_full);
        assert!(outcome.inserted >= 1 && outcome.inserted < keys.len() as u64);
        assert_eq!(shard.len().unwrap(), outcome.inserted);
        for key in &keys[outcome.inserted as usize..] {
            assert!(!shard.has(*key));
        }

        let retry = shard.add(keys[9], &vectors[9]).unwrap();
        assert_eq!(retry, AddOutcome::full());
        assert_eq!(shard.len().unwrap(), outcome.inserted);
    }

    #[test]
    fn test_rejects_wrong_dimensions() {
        let mut engine = engine(4);
        engine.reserve(1).unwrap();
        let err = engine.add(1, &[1.0]).unwrap_err();
        assert!(matches!(err, EngineError::DimensionMismatch { expected: 4, actual: 1 }));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shard.usearch");

        let mut engine = engine(2);
        engine.reserve(2).unwrap();
        engine.add(7, &[1.0, 2.0]).unwrap();
        engine.save(&path).unwrap();

        let mut restored = self::engine(2);
        restored.load(&path).unwrap();
        assert_eq!(restored.len().unwrap(), 1);
        assert_eq!(restored.get(7, 1).unwrap(), vec![1.0, 2.0]);
    }
}
