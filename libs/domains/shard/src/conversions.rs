use crate::error::{ShardError, ShardResult};
use crate::models::{AddOutcome, SearchHit};
use crate::validation::MISSING_ARGUMENTS;

// Import generated proto types
use rpc::shard::{
    AddMultiResponse, AddResponse, SearchResponse, Vector as ProtoVector,
};

// ===== Vectors =====

/// Components of a required vector field.
pub fn vector_from_proto(vector: Option<ProtoVector>) -> ShardResult<Vec<f32>> {
    vector
        .map(|v| v.values)
        .ok_or_else(|| ShardError::Validation(MISSING_ARGUMENTS.to_string()))
}

pub fn vectors_from_proto(vectors: Vec<ProtoVector>) -> Vec<Vec<f32>> {
    vectors.into_iter().map(|v| v.values).collect()
}

pub fn vector_to_proto(values: Vec<f32>) -> ProtoVector {
    ProtoVector { values }
}

pub fn limit_from_proto(limit: u32) -> ShardResult<usize> {
    usize::try_from(limit)
        .map_err(|_| ShardError::Validation(format!("limit {} is too large", limit)))
}

// ===== Results =====

pub fn search_response(hits: Vec<SearchHit>) -> SearchResponse {
    let (keys, distances) = hits.into_iter().map(|hit| (hit.key, hit.distance)).unzip();
    SearchResponse { keys, distances }
}

impl From<AddOutcome> for AddResponse {
    fn from(outcome: AddOutcome) -> Self {
        AddResponse {
            shard_full: outcome.is_full,
        }
    }
}

impl From<AddOutcome> for AddMultiResponse {
    fn from(outcome: AddOutcome) -> Self {
        AddMultiResponse {
            inserted: outcome.inserted,
            shard_full: outcome.is_full,
        }
    }
}
