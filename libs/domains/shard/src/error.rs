use prost::Message;
use rpc::shard::AddMultiResponse;
use thiserror::Error;
use tonic::codegen::Bytes;

use crate::models::Key;

/// Failures reported by an index engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("index error: {0}")]
    Index(String),

    #[error("expected {expected} dimensions, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encoding error: {0}")]
    Codec(#[from] postcard::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// A bulk insert that stopped on an engine failure.
///
/// `inserted` items were committed before the failure and stay in the shard.
#[derive(Debug, Error)]
#[error("{operation} failed after {inserted} inserted item(s): {source}")]
pub struct BatchInsertError {
    pub operation: &'static str,
    pub inserted: u64,
    pub is_full: bool,
    #[source]
    pub source: EngineError,
}

impl BatchInsertError {
    pub fn new(operation: &'static str, inserted: u64, is_full: bool, source: EngineError) -> Self {
        Self {
            operation,
            inserted,
            is_full,
            source,
        }
    }

    /// Partial result as it travels in the status details.
    pub fn partial_result(&self) -> AddMultiResponse {
        AddMultiResponse {
            inserted: self.inserted,
            shard_full: self.is_full,
        }
    }
}

#[derive(Debug, Error)]
pub enum ShardError {
    #[error("{0}")]
    Validation(String),

    #[error("key not found: {0}")]
    NotFound(Key),

    #[error("{operation} failed: {source}")]
    Engine {
        operation: &'static str,
        #[source]
        source: EngineError,
    },

    #[error(transparent)]
    Batch(#[from] BatchInsertError),

    #[error("shard not initialized")]
    NotInitialized,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ShardResult<T> = Result<T, ShardError>;

impl ShardError {
    pub fn engine(operation: &'static str, source: EngineError) -> Self {
        ShardError::Engine { operation, source }
    }
}

impl From<tokio::task::JoinError> for ShardError {
    fn from(err: tokio::task::JoinError) -> Self {
        ShardError::Internal(format!("blocking task failed: {}", err))
    }
}

impl From<ShardError> for tonic::Status {
    fn from(err: ShardError) -> Self {
        match err {
            ShardError::Validation(msg) => tonic::Status::invalid_argument(msg),
            ShardError::NotFound(key) => {
                tonic::Status::not_found(format!("key not found: {}", key))
            }
            ShardError::Engine { .. } => tonic::Status::internal(err.to_string()),
            ShardError::Batch(batch) => {
                let details = Bytes::from(batch.partial_result().encode_to_vec());
                tonic::Status::with_details(tonic::Code::Internal, batch.to_string(), details)
            }
            ShardError::NotInitialized => tonic::Status::failed_precondition(err.to_string()),
            ShardError::Internal(msg) => tonic::Status::internal(msg),
        }
    }
}

/// Decode the partial AddMulti result carried by an INTERNAL status.
///
/// Empty details decode to zero progress.
pub fn partial_result(status: &tonic::Status) -> Option<AddMultiResponse> {
    if status.code() != tonic::Code::Internal {
        return None;
    }
    AddMultiResponse::decode(status.details()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_maps_to_invalid_argument() {
        let status: tonic::Status = ShardError::Validation("no data provided".into()).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);
        assert_eq!(status.message(), "no data provided");
    }

    #[test]
    fn test_not_found_and_not_initialized() {
        let status: tonic::Status = ShardError::NotFound(7).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status = ShardError::NotInitialized.into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);
    }

    #[test]
    fn test_engine_error_keeps_operation_context() {
        let err = ShardError::engine("save", EngineError::Index("disk full".into()));
        let status: tonic::Status = err.into();
        assert_eq!(status.code(), tonic::Code::Internal);
        assert!(status.message().contains("save failed"));
        assert!(status.message().contains("disk full"));
        assert_eq!(partial_result(&status), Some(AddMultiResponse::default()));
    }

    #[test]
    fn test_batch_error_carries_partial_result() {
        let err = BatchInsertError::new("add_multi", 3, false, EngineError::Index("boom".into()));
        let status: tonic::Status = ShardError::from(err).into();

        assert_eq!(status.code(), tonic::Code::Internal);
        let partial = partial_result(&status).expect("details should decode");
        assert_eq!(partial.inserted, 3);
        assert!(!partial.shard_full);
    }

    #[test]
    fn test_partial_result_ignores_other_codes() {
        let status = tonic::Status::invalid_argument("bad");
        assert!(partial_result(&status).is_none());
    }
}
