pub mod config;

pub use config::ChannelConfig;

use crate::error::{GrpcError, GrpcResult};
use tonic::transport::{Channel, Endpoint};

/// Creates a lazy gRPC channel that connects on first request
///
/// The frontend builds its downstream shard channels at startup; shards may
/// come up later, so no connection is attempted until the first RPC.
///
/// ## Example
/// ```ignore
/// use grpc_client::create_channel_lazy;
/// use rpc::shard::shard_service_client::ShardServiceClient;
///
/// // Returns immediately, no connection attempt yet
/// let channel = create_channel_lazy("http://127.0.0.1:3000")?;
/// let mut client = ShardServiceClient::new(channel);
///
/// // Connection is established here on first RPC call
/// let response = client.length(Empty {}).await?;
/// ```
pub fn create_channel_lazy(addr: impl Into<String>) -> GrpcResult<Channel> {
  let addr_string = addr.into();

  let endpoint = Endpoint::from_shared(addr_string.clone()).map_err(|e| {
    tracing::error!(target: "grpc_client", addr = %addr_string, error = ?e, "Invalid URI");
    GrpcError::InvalidUri {
      uri: addr_string.clone(),
      source: e,
    }
  })?;

  let endpoint = ChannelConfig::default().apply_to_endpoint(endpoint);

  tracing::debug!(
        target: "grpc_client",
        addr = %addr_string,
        "Creating lazy gRPC channel (connects on first request)"
    );

  Ok(endpoint.connect_lazy())
}
