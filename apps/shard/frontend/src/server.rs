//! gRPC server initialization and lifecycle management for the frontend

use core_config::{Environment, FromEnv};
use eyre::{Result, WrapErr};
use grpc_client::{GrpcServer, ShutdownCoordinator, drain};
use rpc::frontend::frontend_service_server::{FrontendServiceServer, SERVICE_NAME};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::{error, info};

use crate::config::FrontendConfig;
use crate::placement::{PlacementStrategy, SingleShard};
use crate::service::{FrontendServiceImpl, connect_shards};

/// Run the frontend
///
/// Sets up logging, loads configuration, binds the listener and serves until
/// SIGINT or SIGTERM.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    let level = core_config::tracing::log_level_from_env().wrap_err("Invalid LOG_LEVEL")?;
    core_config::tracing::init_tracing(&environment, level);

    let config = FrontendConfig::from_env().wrap_err("Failed to load frontend configuration")?;
    info!(
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
        environment = ?environment,
        dimensions = config.dimensions,
        shards = ?config.shard_addresses,
        "Starting shard frontend"
    );

    let address = config.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", address))?;

    let shutdown = ShutdownCoordinator::new();
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    serve(config, SingleShard, listener, shutdown).await
}

/// Serve the frontend on `listener` until `shutdown` fires.
pub async fn serve<P: PlacementStrategy>(
    config: FrontendConfig,
    placement: P,
    listener: TcpListener,
    shutdown: ShutdownCoordinator,
) -> Result<()> {
    let shards =
        connect_shards(&config.shard_addresses).wrap_err("Invalid shard address")?;
    let service = FrontendServiceImpl::new(shards, placement, config.dimensions);

    let (health_reporter, health_service) = health_reporter();
    GrpcServer::setup_health(&health_reporter, SERVICE_NAME).await;

    let addr = listener.local_addr().wrap_err("Listener has no local address")?;
    GrpcServer::log_startup(&addr, SERVICE_NAME);

    let stop = shutdown.clone();
    let mut server = tokio::spawn(
        Server::builder()
            .add_service(health_service)
            .add_service(
                FrontendServiceServer::new(service)
                    .accept_compressed(CompressionEncoding::Zstd)
                    .send_compressed(CompressionEncoding::Zstd),
            )
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                stop.cancelled().await
            }),
    );

    let served = tokio::select! {
        _ = shutdown.cancelled() => {
            GrpcServer::set_not_serving(&health_reporter, SERVICE_NAME).await;
            drain(server, config.shutdown_grace_period)
                .await
                .wrap_err("gRPC server did not shut down cleanly")
        }
        joined = &mut server => {
            error!("gRPC server exited before shutdown was requested");
            joined
                .wrap_err("gRPC server task failed")
                .and_then(|r| r.wrap_err("gRPC server failed"))
        }
    };
    shutdown.shutdown();

    info!("Shutdown complete");
    served
}
