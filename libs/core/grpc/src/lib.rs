//! # gRPC Plumbing
//!
//! Shared client and server helpers for the shard services.
//!
//! ## Features
//!
//! - **Lazy Channels**: Downstream channels with HTTP/2 keep-alive and timeouts,
//!   connected on first request
//! - **Request IDs**: `x-request-id` injection for correlating frontend and shard logs
//! - **Health**: `grpc.health.v1.Health` serving/not-serving transitions
//! - **Shutdown**: SIGINT/SIGTERM coordination and bounded draining
//!
//! ## Quick Start
//!
//! ```ignore
//! use grpc_client::{create_channel_lazy, TracingInterceptor};
//! use rpc::shard::shard_service_client::ShardServiceClient;
//!
//! let channel = create_channel_lazy("http://127.0.0.1:3000")?;
//! let client = ShardServiceClient::with_interceptor(channel, TracingInterceptor::new())
//!     .accept_compressed(tonic::codec::CompressionEncoding::Zstd)
//!     .send_compressed(tonic::codec::CompressionEncoding::Zstd);
//! ```

pub mod channel;
pub mod error;
pub mod interceptors;
pub mod server;
pub mod shutdown;

// Re-export main types and functions for convenience
pub use channel::{ChannelConfig, create_channel_lazy};
pub use error::{GrpcError, GrpcResult};
pub use interceptors::TracingInterceptor;
pub use server::{GrpcServer, drain};
pub use shutdown::ShutdownCoordinator;
