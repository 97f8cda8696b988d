//! gRPC Server helpers
//!
//! Health reporting and bounded draining shared by the shard worker and the
//! frontend.
//!
//! ```ignore
//! use grpc_client::{GrpcServer, ShutdownCoordinator, drain};
//! use rpc::shard::shard_service_server::{ShardServiceServer, SERVICE_NAME};
//!
//! let (health_reporter, health_service) = tonic_health::server::health_reporter();
//! GrpcServer::setup_health(&health_reporter, SERVICE_NAME).await;
//! GrpcServer::log_startup(&addr, SERVICE_NAME);
//!
//! let mut shutdown = coordinator.subscribe();
//! let server = tokio::spawn(
//!     Server::builder()
//!         .add_service(health_service)
//!         .add_service(ShardServiceServer::new(service))
//!         .serve_with_incoming_shutdown(incoming, async move {
//!             let _ = shutdown.recv().await;
//!         }),
//! );
//!
//! coordinator.wait_for_signal().await;
//! GrpcServer::set_not_serving(&health_reporter, SERVICE_NAME).await;
//! drain(server, grace).await?;
//! ```

mod builder;

pub use builder::{GrpcServer, drain};
