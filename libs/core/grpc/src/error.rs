use std::time::Duration;
use thiserror::Error;

pub type GrpcResult<T> = Result<T, GrpcError>;

/// Errors raised while wiring gRPC clients and servers
#[derive(Error, Debug)]
pub enum GrpcError {
  /// Invalid URI provided for a downstream channel
  #[error("Invalid URI '{uri}': {source}")]
  InvalidUri {
    uri: String,
    #[source]
    source: tonic::transport::Error,
  },

  /// The server stopped with a transport error
  #[error("gRPC server failed: {0}")]
  Serve(#[from] tonic::transport::Error),

  /// In-flight requests did not finish in time
  #[error("Server did not drain within {0:?}")]
  DrainTimeout(Duration),

  /// The server task panicked or was cancelled
  #[error("Server task failed: {0}")]
  Task(#[from] tokio::task::JoinError),
}

impl From<GrpcError> for tonic::Status {
  fn from(err: GrpcError) -> Self {
    match err {
      GrpcError::InvalidUri { .. } => tonic::Status::invalid_argument(err.to_string()),
      _ => tonic::Status::unavailable(err.to_string()),
    }
  }
}
