use std::path::PathBuf;
use std::time::Duration;

use core_config::server::ServerConfig;
use domain_shard::error::partial_result;
use domain_shard::{MemoryEngine, Shard, ShardConfig, ShardHandle};
use grpc_client::ShutdownCoordinator;
use rpc::frontend::frontend_service_client::FrontendServiceClient;
use rpc::shard::shard_service_server::ShardServiceServer;
use rpc::shard::{
    AddMultiRequest, AddRequest, DeleteRequest, Empty, GetRequest, HasRequest, SearchRequest,
    Vector,
};
use shard_frontend::SingleShard;
use shard_frontend::config::FrontendConfig;
use shard_worker::service::ShardServiceImpl;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::Code;
use tonic::codec::CompressionEncoding;
use tonic::transport::{Channel, Server};
use tracing::level_filters::LevelFilter;

const DIMS: usize = 4;

fn vector(values: [f32; DIMS]) -> Option<Vector> {
    Some(Vector { values: values.to_vec() })
}

/// Start a shard worker with an in-memory engine, returning its endpoint.
async fn start_shard(max_size_bytes: u64) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());

    let config = ShardConfig::new(DIMS, max_size_bytes);
    let engine = MemoryEngine::new(&config).unwrap();
    let service = ShardServiceImpl::new(
        ShardHandle::new(Shard::new(config, engine)),
        DIMS,
        PathBuf::from("unused.shard"),
    );

    tokio::spawn(
        Server::builder()
            .add_service(
                ShardServiceServer::new(service)
                    .accept_compressed(CompressionEncoding::Zstd)
                    .send_compressed(CompressionEncoding::Zstd),
            )
            .serve_with_incoming(TcpListenerStream::new(listener)),
    );
    endpoint
}

/// Start a frontend in front of `shard_endpoint`.
async fn start_frontend(
    shard_endpoint: String,
) -> (FrontendServiceClient<Channel>, ShutdownCoordinator) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());

    let config = FrontendConfig {
        server: ServerConfig::new("127.0.0.1".to_string(), 1),
        log_level: LevelFilter::INFO,
        dimensions: DIMS,
        shard_addresses: vec![shard_endpoint],
        shutdown_grace_period: Duration::from_secs(5),
    };
    let shutdown = ShutdownCoordinator::new();
    tokio::spawn(shard_frontend::serve(
        config,
        SingleShard,
        listener,
        shutdown.clone(),
    ));

    let client = FrontendServiceClient::connect(endpoint).await.unwrap();
    (client, shutdown)
}

#[tokio::test]
async fn test_forwards_to_shard() {
    let (mut client, shutdown) = start_frontend(start_shard(1 << 20).await).await;

    let added = client
        .add(AddRequest {
            key: 1,
            vector: vector([1.0, 0.0, 0.0, 0.0]),
        })
        .await
        .unwrap()
        .into_inner();
    assert!(!added.shard_full);

    client
        .add_multi(AddMultiRequest {
            keys: vec![2, 3],
            vectors: vec![
                Vector { values: vec![0.0, 1.0, 0.0, 0.0] },
                Vector { values: vec![0.0, 0.0, 1.0, 0.0] },
            ],
        })
        .await
        .unwrap();

    let length = client.length(Empty {}).await.unwrap().into_inner().length;
    assert_eq!(length, 3);

    let found = client
        .get(GetRequest { key: 2, count: 1 })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(found.vector.unwrap().values, vec![0.0, 1.0, 0.0, 0.0]);

    let hits = client
        .search(SearchRequest {
            query: vector([0.0, 0.0, 0.9, 0.1]),
            limit: 1,
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(hits.keys, vec![3]);

    let deleted = client
        .delete(DeleteRequest { key: 1 })
        .await
        .unwrap()
        .into_inner();
    assert!(deleted.ok);
    assert!(!client.has(HasRequest { key: 1 }).await.unwrap().into_inner().ok);

    shutdown.shutdown();
}

#[tokio::test]
async fn test_rejects_before_forwarding() {
    let (mut client, shutdown) = start_frontend(start_shard(1 << 20).await).await;

    let status = client
        .add(AddRequest {
            key: 1,
            vector: Some(Vector { values: vec![1.0, 2.0, 3.0] }),
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.message(), "expected 4 dimensions, got 3");

    let status = client
        .add_multi(AddMultiRequest {
            keys: vec![1, 2],
            vectors: vec![Vector { values: vec![0.0; DIMS] }],
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client
        .get(GetRequest { key: 1, count: 0 })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let length = client.length(Empty {}).await.unwrap().into_inner().length;
    assert_eq!(length, 0);

    shutdown.shutdown();
}

#[tokio::test]
async fn test_passes_downstream_status_through() {
    let (mut client, shutdown) = start_frontend(start_shard(1 << 20).await).await;

    let status = client
        .delete(DeleteRequest { key: 404 })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);

    let status = client
        .get(GetRequest { key: 404, count: 1 })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::NotFound);
    assert!(partial_result(&status).is_none());

    shutdown.shutdown();
}

#[tokio::test]
async fn test_full_shard_reported_through_frontend() {
    let probe = MemoryEngine::new(&ShardConfig::new(DIMS, 1)).unwrap();
    let budget = probe.estimated_length(2) as u64;
    let (mut client, shutdown) = start_frontend(start_shard(budget).await).await;

    let batch = client
        .add_multi(AddMultiRequest {
            keys: vec![1, 2, 3],
            vectors: vec![
                Vector { values: vec![1.0, 0.0, 0.0, 0.0] },
                Vector { values: vec![0.0, 1.0, 0.0, 0.0] },
                Vector { values: vec![0.0, 0.0, 1.0, 0.0] },
            ],
        })
        .await
        .unwrap()
        .into_inner();
    assert_eq!(batch.inserted, 2);
    assert!(batch.shard_full);
    assert!(!client.has(HasRequest { key: 3 }).await.unwrap().into_inner().ok);

    shutdown.shutdown();
}
