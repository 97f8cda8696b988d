use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ShardError, ShardResult};

/// Opaque vector identifier. Uniqueness is left to the engine.
pub type Key = u64;

/// Numeric encoding used by the engine to store vector components
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quantization {
    #[default]
    F32,
    BF16,
    F16,
    F64,
    I8,
    B1,
}

impl Quantization {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quantization::F32 => "F32",
            Quantization::BF16 => "BF16",
            Quantization::F16 => "F16",
            Quantization::F64 => "F64",
            Quantization::I8 => "I8",
            Quantization::B1 => "B1",
        }
    }

    /// Bytes needed to store `dimensions` components with this encoding.
    pub fn bytes_for(&self, dimensions: usize) -> usize {
        match self {
            Quantization::F64 => dimensions * 8,
            Quantization::F32 => dimensions * 4,
            Quantization::BF16 | Quantization::F16 => dimensions * 2,
            Quantization::I8 => dimensions,
            Quantization::B1 => dimensions.div_ceil(8),
        }
    }
}

impl fmt::Display for Quantization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quantization {
    type Err = ShardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "f32" => Ok(Quantization::F32),
            "bf16" => Ok(Quantization::BF16),
            "f16" => Ok(Quantization::F16),
            "f64" => Ok(Quantization::F64),
            "i8" => Ok(Quantization::I8),
            "b1" => Ok(Quantization::B1),
            other => Err(ShardError::Validation(format!(
                "unknown quantization '{}', expected one of F32, BF16, F16, F64, I8, B1",
                other
            ))),
        }
    }
}

/// Distance function used to rank search results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Metric {
    InnerProduct,
    #[default]
    Cosine,
    L2Squared,
    Haversine,
    Divergence,
    Pearson,
    Hamming,
    Tanimoto,
    Sorensen,
}

impl Metric {
    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::InnerProduct => "InnerProduct",
            Metric::Cosine => "Cosine",
            Metric::L2Squared => "L2Squared",
            Metric::Haversine => "Haversine",
            Metric::Divergence => "Divergence",
            Metric::Pearson => "Pearson",
            Metric::Hamming => "Hamming",
            Metric::Tanimoto => "Tanimoto",
            Metric::Sorensen => "Sorensen",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ShardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "innerproduct" | "ip" => Ok(Metric::InnerProduct),
            "cosine" | "cos" => Ok(Metric::Cosine),
            "l2sq" | "l2squared" => Ok(Metric::L2Squared),
            "haversine" => Ok(Metric::Haversine),
            "divergence" => Ok(Metric::Divergence),
            "pearson" => Ok(Metric::Pearson),
            "hamming" => Ok(Metric::Hamming),
            "tanimoto" => Ok(Metric::Tanimoto),
            "sorensen" => Ok(Metric::Sorensen),
            other => Err(ShardError::Validation(format!("unknown metric '{}'", other))),
        }
    }
}

/// Immutable parameters of a shard and of the index it wraps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShardConfig {
    pub dimensions: usize,
    pub metric: Metric,
    pub quantization: Quantization,
    /// Engine tuning, 0 keeps the engine default
    pub connectivity: usize,
    pub expansion_add: usize,
    pub expansion_search: usize,
    /// Allow several vectors under the same key
    pub multi: bool,
    /// Serialized size at which the shard stops accepting inserts
    pub max_size_bytes: u64,
}

impl ShardConfig {
    pub fn new(dimensions: usize, max_size_bytes: u64) -> Self {
        Self {
            dimensions,
            metric: Metric::default(),
            quantization: Quantization::default(),
            connectivity: 0,
            expansion_add: 0,
            expansion_search: 0,
            multi: false,
            max_size_bytes,
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    pub fn with_quantization(mut self, quantization: Quantization) -> Self {
        self.quantization = quantization;
        self
    }

    pub fn with_connectivity(mut self, connectivity: usize) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_expansion(mut self, expansion_add: usize, expansion_search: usize) -> Self {
        self.expansion_add = expansion_add;
        self.expansion_search = expansion_search;
        self
    }

    pub fn with_multi(mut self, multi: bool) -> Self {
        self.multi = multi;
        self
    }

    pub fn validate(&self) -> ShardResult<()> {
        if self.dimensions == 0 {
            return Err(ShardError::Validation(
                "dimensions must be greater than 0".to_string(),
            ));
        }
        if self.max_size_bytes == 0 {
            return Err(ShardError::Validation(
                "max size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// A single search match
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit {
    pub key: Key,
    pub distance: f32,
}

impl SearchHit {
    pub fn new(key: Key, distance: f32) -> Self {
        Self { key, distance }
    }
}

/// Successful result of a (bulk) insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddOutcome {
    pub inserted: u64,
    pub is_full: bool,
}

impl AddOutcome {
    pub fn full() -> Self {
        Self {
            inserted: 0,
            is_full: true,
        }
    }
}
