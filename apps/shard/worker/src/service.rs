//! Shard gRPC service implementation
//!
//! Every handler validates the request against the collection dimensions,
//! calls the shard handle and maps [`ShardError`](domain_shard::ShardError)
//! into a `tonic::Status`.

use std::path::PathBuf;

use domain_shard::{
    IndexEngine, RequestValidator, ShardHandle,
    conversions::{
        limit_from_proto, search_response, vector_from_proto, vector_to_proto, vectors_from_proto,
    },
};
use rpc::shard::{
    AddMultiRequest, AddMultiResponse, AddRequest, AddResponse, CapacityResponse, DeleteRequest,
    DeleteResponse, Empty, GetRequest, GetResponse, HasRequest, HasResponse, LengthResponse,
    SearchRequest, SearchResponse, SizeResponse,
    shard_service_server::ShardService as ShardServiceTrait,
};
use tonic::{Request, Response, Status};
use tracing::{debug, info};

/// gRPC service implementation for one shard
///
/// Generic over the index engine for testability.
pub struct ShardServiceImpl<E> {
    handle: ShardHandle<E>,
    validator: RequestValidator,
    path: PathBuf,
}

impl<E: IndexEngine> ShardServiceImpl<E> {
    /// `path` is where the Save RPC persists the shard.
    pub fn new(handle: ShardHandle<E>, dimensions: usize, path: PathBuf) -> Self {
        Self {
            handle,
            validator: RequestValidator::new(dimensions),
            path,
        }
    }
}

#[tonic::async_trait]
impl<E: IndexEngine> ShardServiceTrait for ShardServiceImpl<E> {
    // ===== Queries =====

    async fn search(
        &self,
        request: Request<SearchRequest>,
    ) -> Result<Response<SearchResponse>, Status> {
        let req = request.into_inner();
        let query = vector_from_proto(req.query)?;
        self.validator.vector(&query)?;
        let limit = limit_from_proto(req.limit)?;

        let hits = self
            .handle
            .search(query, limit)
            .await
            .map_err(Status::from)?;

        debug!(limit, found = hits.len(), "Search completed");
        Ok(Response::new(search_response(hits)))
    }

    async fn get(&self, request: Request<GetRequest>) -> Result<Response<GetResponse>, Status> {
        let req = request.into_inner();
        let count = self.validator.count(req.count)?;

        let values = self
            .handle
            .get(req.key, count)
            .await
            .map_err(Status::from)?;

        Ok(Response::new(GetResponse {
            vector: Some(vector_to_proto(values)),
        }))
    }

    async fn has(&self, request: Request<HasRequest>) -> Result<Response<HasResponse>, Status> {
        let req = request.into_inner();
        let ok = self.handle.has(req.key).await;
        Ok(Response::new(HasResponse { ok }))
    }

    async fn length(&self, _request: Request<Empty>) -> Result<Response<LengthResponse>, Status> {
        let length = self.handle.len().await.map_err(Status::from)?;
        Ok(Response::new(LengthResponse { length }))
    }

    async fn capacity(
        &self,
        _request: Request<Empty>,
    ) -> Result<Response<CapacityResponse>, Status> {
        let capacity = self.handle.capacity().await.map_err(Status::from)?;
        Ok(Response::new(CapacityResponse { capacity }))
    }

    async fn size(&self, _request: Request<Empty>) -> Result<Response<SizeResponse>, Status> {
        let size = self.handle.size().await.map_err(Status::from)?;
        Ok(Response::new(SizeResponse { size }))
    }

    // ===== Mutations =====

    async fn add(&self, request: Request<AddRequest>) -> Result<Response<AddResponse>, Status> {
        let req = request.into_inner();
        let vector = vector_from_proto(req.vector)?;
        self.validator.vector(&vector)?;

        let outcome = self
            .handle
            .add(req.key, vector)
            .await
            .map_err(Status::from)?;

        Ok(Response::new(outcome.into()))
    }

    async fn add_multi(
        &self,
        request: Request<AddMultiRequest>,
    ) -> Result<Response<AddMultiResponse>, Status> {
        let req = request.into_inner();
        let vectors = vectors_from_proto(req.vectors);
        self.validator.batch(&req.keys, &vectors)?;

        let outcome = self
            .handle
            .add_multi(req.keys, vectors)
            .await
            .map_err(Status::from)?;

        Ok(Response::new(outcome.into()))
    }

    async fn delete(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        let req = request.into_inner();
        self.handle.delete(req.key).await.map_err(Status::from)?;

        debug!(key = req.key, "Deleted key");
        Ok(Response::new(DeleteResponse { ok: true }))
    }

    async fn save(&self, _request: Request<Empty>) -> Result<Response<Empty>, Status> {
        self.handle
            .save(self.path.clone())
            .await
            .map_err(Status::from)?;

        info!(path = %self.path.display(), "Shard saved on request");
        Ok(Response::new(Empty {}))
    }
}
