//! Frontend gRPC service implementation
//!
//! Requests are validated against the collection dimensions before they leave
//! the frontend; downstream statuses, including partial-result details on a
//! failed AddMulti, are returned to the caller untouched.

use domain_shard::{Key, RequestValidator};
use grpc_client::interceptors::{TracingInterceptor, request_id, REQUEST_ID_HEADER};
use grpc_client::{GrpcResult, create_channel_lazy};
use rpc::frontend::frontend_service_server::FrontendService as FrontendServiceTrait;
use rpc::shard::shard_service_client::ShardServiceClient;
use rpc::shard::{
    AddMultiRequest, AddMultiResponse, AddRequest, AddResponse, DeleteRequest, DeleteResponse,
    Empty, GetRequest, GetResponse, HasRequest, HasResponse, LengthResponse, SearchRequest,
    SearchResponse, SizeResponse,
};
use tonic::codec::CompressionEncoding;
use tonic::service::interceptor::InterceptedService;
use tonic::transport::Channel;
use tonic::{Request, Response, Status};
use tracing::{debug, warn};

use crate::placement::PlacementStrategy;

/// Client for one downstream shard worker
pub type ShardClient = ShardServiceClient<InterceptedService<Channel, TracingInterceptor>>;

/// Build lazily connected clients for `addresses`, in order.
pub fn connect_shards(addresses: &[String]) -> GrpcResult<Vec<ShardClient>> {
    addresses
        .iter()
        .map(|address| {
            let channel = create_channel_lazy(address.clone())?;
            Ok(ShardServiceClient::with_interceptor(channel, TracingInterceptor::new())
                .accept_compressed(CompressionEncoding::Zstd)
                .send_compressed(CompressionEncoding::Zstd))
        })
        .collect()
}

/// gRPC service implementation for the routing tier
pub struct FrontendServiceImpl<P> {
    shards: Vec<ShardClient>,
    placement: P,
    validator: RequestValidator,
}

impl<P: PlacementStrategy> FrontendServiceImpl<P> {
    pub fn new(shards: Vec<ShardClient>, placement: P, dimensions: usize) -> Self {
        Self {
            shards,
            placement,
            validator: RequestValidator::new(dimensions),
        }
    }

    fn shard(&self, index: usize) -> Result<ShardClient, Status> {
        self.shards
            .get(index)
            .cloned()
            .ok_or_else(|| Status::internal(format!("no shard at index {}", index)))
    }

    fn shard_for_key(&self, key: Key) -> Result<ShardClient, Status> {
        self.shard(self.placement.shard_for_key(key, self.shards.len()))
    }

    fn default_shard(&self) -> Result<ShardClient, Status> {
        self.shard(self.placement.default_shard())
    }

    /// Single downstream shard for a batch; batches spanning shards are refused.
    fn shard_for_batch(&self, keys: &[Key]) -> Result<ShardClient, Status> {
        let count = self.shards.len();
        let mut indices = keys
            .iter()
            .map(|key| self.placement.shard_for_key(*key, count));
        let first = indices.next().unwrap_or_else(|| self.placement.default_shard());
        if indices.any(|index| index != first) {
            return Err(Status::unimplemented(
                "batches spanning multiple shards are not supported",
            ));
        }
        self.shard(first)
    }
}

/// Wrap `message` for the downstream call, carrying the caller's request id.
fn downstream<T, U>(incoming: &Request<T>, message: U) -> Request<U> {
    let mut request = Request::new(message);
    if let Some(value) = request_id(incoming).and_then(|id| id.parse().ok()) {
        request.metadata_mut().insert(REQUEST_ID_HEADER, value);
    }
    request
}

#[tonic::async_trait]
impl<P: PlacementStrategy> FrontendServiceTrait for FrontendServiceImpl<P> {
    async fn search(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<SearchResponse>, Status> {
        let req = request.get_ref();
        let query = self.validator.require(req.query.as_ref())?;
        self.validator.vector(&query.values)?;

        let mut client = self.default_shard()?;
        let message = SearchRequest {
            query: req.query.clone(),
            limit: req.limit,
        };
        client.search(downstream(&request, message)).await
    }

    async fn add(&self, request: Request<AddRequest>) -> Result<Response<AddResponse>, Status> {
        let req = request.get_ref();
        let vector = self.validator.require(req.vector.as_ref())?;
        self.validator.vector(&vector.values)?;

        let mut client = self.shard_for_key(req.key)?;
        let message = req.clone();
        client.add(downstream(&request, message)).await
    }

    async fn add_multi(
        &self,
        request: Request<AddMultiRequest>,
    ) -> Result<Response<AddMultiResponse>, Status> {
        let req = request.get_ref();
        let values: Vec<&[f32]> = req.vectors.iter().map(|v| v.values.as_slice()).collect();
        self.validator.batch(&req.keys, &values)?;

        let mut client = self.shard_for_batch(&req.keys)?;
        debug!(items = req.keys.len(), "Forwarding batch");
        let message = req.clone();
        client.add_multi(downstream(&request, message)).await
    }

    async fn get(&self, request: Request<GetRequest>) -> Result<Response<GetResponse>, Status> {
        let req = request.get_ref();
        self.validator.count(req.count)?;

        let mut client = self.shard_for_key(req.key)?;
        let message = req.clone();
        client.get(downstream(&request, message)).await
    }

    /// A downstream failure reads as absent, matching the shard's own Has.
    async fn has(&self, request: Request<HasRequest>) -> Result<Response<HasResponse>, Status> {
        let key = request.get_ref().key;
        let mut client = self.shard_for_key(key)?;
        match client.has(downstream(&request, HasRequest { key })).await {
            Ok(response) => Ok(response),
            Err(status) => {
                warn!(key, code = ?status.code(), error = %status.message(), "Has lookup failed downstream");
                Ok(Response::new(HasResponse { ok: false }))
            }
        }
    }

    async fn delete(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let key = request.get_ref().key;
        let mut client = self.shard_for_key(key)?;
        client.delete(downstream(&request, DeleteRequest { key })).await
    }

    async fn save(&self, request: Request<Empty>) -> Result<Response<Empty>, Status> {
        let mut client = self.default_shard()?;
        client.save(downstream(&request, Empty {})).await
    }

    async fn length(&self, request: Request<Empty>) -> Result<Response<LengthResponse>, Status> {
        let mut client = self.default_shard()?;
        client.length(downstream(&request, Empty {})).await
    }

    async fn size(&self, request: Request<Empty>) -> Result<Response<SizeResponse>, Status> {
        let mut client = self.default_shard()?;
        client.size(downstream(&request, Empty {})).await
    }
}
