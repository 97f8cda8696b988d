//! Exact, brute-force engine kept entirely in memory.
//!
//! Suited to tests and small shards. Search is a linear scan, so results are
//! exact rather than approximate. Only the inner product, cosine and squared
//! L2 metrics are supported.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::IndexEngine;
use crate::error::{EngineError, EngineResult};
use crate::models::{Key, Metric, Quantization, SearchHit, ShardConfig};

const FORMAT_VERSION: u32 = 1;

/// Fixed bytes accounted for every saved index.
pub const HEADER_LEN: usize = 32;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    dimensions: usize,
    metric: Metric,
    multi: bool,
    entries: Vec<(Key, Vec<f32>)>,
}

#[derive(Debug, Clone)]
pub struct MemoryEngine {
    dimensions: usize,
    metric: Metric,
    quantization: Quantization,
    multi: bool,
    capacity: usize,
    entries: Vec<(Key, Vec<f32>)>,
}

impl MemoryEngine {
    pub fn new(config: &ShardConfig) -> EngineResult<Self> {
        match config.metric {
            Metric::InnerProduct | Metric::Cosine | Metric::L2Squared => {}
            other => {
                return Err(EngineError::Unsupported(format!(
                    "metric {} is not available in the memory engine",
                    other
                )));
            }
        }

        Ok(Self {
            dimensions: config.dimensions,
            metric: config.metric,
            quantization: config.quantization,
            multi: config.multi,
            capacity: 0,
            entries: Vec::new(),
        })
    }

    /// Serialized size of an index holding `items` vectors.
    pub fn estimated_length(&self, items: usize) -> usize {
        HEADER_LEN + items * (std::mem::size_of::<Key>() + self.quantization.bytes_for(self.dimensions))
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

    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.metric {
            Metric::L2Squared => a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum(),
            Metric::InnerProduct => 1.0 - dot(a, b),
            _ => {
                let norms = (dot(a, a) * dot(b, b)).sqrt();
                if norms == 0.0 {
                    1.0
                } else {
                    1.0 - dot(a, b) / norms
                }
            }
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl IndexEngine for MemoryEngine {
    fn reserve(&mut self, capacity: usize) -> EngineResult<()> {
        self.capacity = self.capacity.max(capacity);
        self.entries
            .reserve(self.capacity.saturating_sub(self.entries.len()));
        Ok(())
    }

    fn add(&mut self, key: Key, vector: &[f32]) -> EngineResult<()> {
        self.check_dimensions(vector)?;
        if !self.multi && self.entries.iter().any(|(k, _)| *k == key) {
            return Err(EngineError::Index(format!("duplicate key {}", key)));
        }
        self.entries.push((key, vector.to_vec()));
        self.capacity = self.capacity.max(self.entries.len());
        Ok(())
    }

    fn remove(&mut self, key: Key) -> EngineResult<usize> {
        let before = self.entries.len();
        self.entries.retain(|(k, _)| *k != key);
        Ok(before - self.entries.len())
    }

    fn get(&self, key: Key, count: usize) -> EngineResult<Vec<f32>> {
        Ok(self
            .entries
            .iter()
            .filter(|(k, _)| *k == key)
            .take(count)
            .flat_map(|(_, v)| v.iter().copied())
            .collect())
    }

    fn search(&self, query: &[f32], limit: usize) -> EngineResult<Vec<SearchHit>> {
        self.check_dimensions(query)?;
        let mut hits: Vec<SearchHit> = self
            .entries
            .iter()
            .map(|(key, vector)| SearchHit::new(*key, self.distance(query, vector)))
            .collect();
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits.truncate(limit);
        Ok(hits)
    }

    fn len(&self) -> EngineResult<usize> {
        Ok(self.entries.len())
    }

    fn capacity(&self) -> EngineResult<usize> {
        Ok(self.capacity)
    }

    fn serialized_length(&self) -> EngineResult<usize> {
        Ok(self.estimated_length(self.entries.len()))
    }

    fn save(&self, path: &Path) -> EngineResult<()> {
        let snapshot = Snapshot {
            version: FORMAT_VERSION,
            dimensions: self.dimensions,
            metric: self.metric,
            multi: self.multi,
            entries: self.entries.clone(),
        };
        let bytes = postcard::to_stdvec(&snapshot)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> EngineResult<()> {
        let bytes = std::fs::read(path)?;
        let snapshot: Snapshot = postcard::from_bytes(&bytes)?;

        if snapshot.version != FORMAT_VERSION {
            return Err(EngineError::Unsupported(format!(
                "file format version {}",
                snapshot.version
            )));
        }
        if snapshot.dimensions != self.dimensions {
            return Err(EngineError::DimensionMismatch {
                expected: self.dimensions,
                actual: snapshot.dimensions,
            });
        }

        self.metric = snapshot.metric;
        self.multi = snapshot.multi;
        self.entries = snapshot.entries;
        self.capacity = self.entries.len();
        Ok(())
    }
}
