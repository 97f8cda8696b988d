//! gRPC server initialization and lifecycle management
//!
//! This module handles all server setup:
//! - Tracing initialization
//! - Loading or creating the shard
//! - gRPC server configuration and startup
//! - Health check service (grpc.health.v1.Health)
//! - Graceful shutdown: drain, final save, release

use std::path::Path;

use core_config::{Environment, FromEnv};
use domain_shard::{EngineFactory, Shard, ShardConfig, ShardHandle};
use eyre::{Result, WrapErr, eyre};
use grpc_client::{GrpcServer, ShutdownCoordinator, drain};
use rpc::shard::shard_service_server::{SERVICE_NAME, ShardServiceServer};
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tonic::codec::CompressionEncoding;
use tonic::transport::Server;
use tonic_health::server::health_reporter;
use tracing::{error, info};

use crate::config::WorkerConfig;
use crate::context::WorkerContext;
use crate::service::ShardServiceImpl;
use crate::sync::spawn_auto_sync;

/// Run the shard worker
///
/// 1. Sets up structured logging (JSON for prod, pretty for dev)
/// 2. Loads and validates configuration
/// 3. Binds the listener and installs signal handling
/// 4. Hands over to [`serve`]
///
/// # Errors
///
/// Returns an error if configuration is invalid, the listener cannot be bound,
/// the shard cannot be opened or the server fails.
pub async fn run() -> Result<()> {
    let environment = Environment::from_env();
    let level = core_config::tracing::log_level_from_env().wrap_err("Invalid LOG_LEVEL")?;
    core_config::tracing::init_tracing(&environment, level);

    let config = WorkerConfig::from_env().wrap_err("Failed to load worker configuration")?;
    let ctx = WorkerContext::new(environment, config);
    ctx.log_startup();

    let address = ctx.config.server.address();
    let listener = TcpListener::bind(&address)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", address))?;

    let shutdown = ShutdownCoordinator::new();
    let signals = shutdown.clone();
    tokio::spawn(async move { signals.wait_for_signal().await });

    #[cfg(feature = "usearch")]
    let factory = domain_shard::UsearchEngineFactory;
    #[cfg(not(feature = "usearch"))]
    let factory = domain_shard::MemoryEngineFactory;

    serve(ctx, factory, listener, shutdown).await
}

/// Serve the shard on `listener` until `shutdown` fires.
///
/// Shutdown runs in two phases: the server stops accepting and drains
/// in-flight requests for at most the configured grace period, then a
/// writable shard is saved and the engine is released. A failed final save is
/// logged and does not change the result.
pub async fn serve<F: EngineFactory>(
    ctx: WorkerContext,
    factory: F,
    listener: TcpListener,
    shutdown: ShutdownCoordinator,
) -> Result<()> {
    let config = ctx.config;
    let shard_config = config.shard.clone();
    let path = config.shard_path.clone();
    let writable = config.writable;

    let shard = tokio::task::spawn_blocking(move || {
        open_shard(&factory, shard_config, &path, writable)
    })
    .await
    .wrap_err("Shard loader panicked")??;
    let handle = ShardHandle::new(shard);

    let service = ShardServiceImpl::new(
        handle.clone(),
        config.shard.dimensions,
        config.shard_path.clone(),
    );

    let (health_reporter, health_service) = health_reporter();
    GrpcServer::setup_health(&health_reporter, SERVICE_NAME).await;

    let auto_sync = config.auto_sync_enabled().then(|| {
        spawn_auto_sync(
            handle.clone(),
            config.shard_path.clone(),
            config.auto_sync_interval,
            shutdown.clone(),
        )
    });

    let addr = listener.local_addr().wrap_err("Listener has no local address")?;
    GrpcServer::log_startup(&addr, SERVICE_NAME);

    let stop = shutdown.clone();
    let mut server = tokio::spawn(
        Server::builder()
            .add_service(health_service)
            .add_service(
                ShardServiceServer::new(service)
                    .accept_compressed(CompressionEncoding::Zstd)
                    .send_compressed(CompressionEncoding::Zstd),
            )
            .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
                stop.cancelled().await
            }),
    );

    // Phase one: stop serving
    let served = tokio::select! {
        _ = shutdown.cancelled() => {
            GrpcServer::set_not_serving(&health_reporter, SERVICE_NAME).await;
            drain(server, config.shutdown_grace_period)
                .await
                .wrap_err("gRPC server did not shut down cleanly")
        }
        joined = &mut server => {
            error!("gRPC server exited before shutdown was requested");
            GrpcServer::set_not_serving(&health_reporter, SERVICE_NAME).await;
            joined
                .wrap_err("gRPC server task failed")
                .and_then(|r| r.wrap_err("gRPC server failed"))
        }
    };
    shutdown.shutdown();

    if let Some(task) = auto_sync {
        if let Err(e) = task.await {
            error!(error = %e, "Auto-sync task failed");
        }
    }

    // Phase two: persist and release
    if config.writable {
        match handle.save(config.shard_path.clone()).await {
            Ok(()) => info!(path = %config.shard_path.display(), "Shard saved on shutdown"),
            Err(e) => error!(error = %e, "Failed to save shard on shutdown"),
        }
    }
    handle.release().await;

    info!("Shutdown complete");
    served
}

/// Load the shard file, or start empty when a writable shard has none yet.
fn open_shard<F: EngineFactory>(
    factory: &F,
    config: ShardConfig,
    path: &Path,
    writable: bool,
) -> Result<Shard<F::Engine>> {
    let engine = factory
        .create(&config)
        .wrap_err("Failed to create index engine")?;

    if path.exists() {
        let shard = Shard::load(config, engine, path)
            .wrap_err_with(|| format!("Failed to load shard from {}", path.display()))?;
        info!(
            path = %path.display(),
            length = shard.len().unwrap_or_default(),
            is_full = shard.is_full(),
            "Shard loaded"
        );
        return Ok(shard);
    }

    if !writable {
        return Err(eyre!(
            "shard file {} does not exist and the shard is read-only",
            path.display()
        ));
    }

    info!(path = %path.display(), "No shard file found, starting empty");
    Ok(Shard::new(config, engine))
}
