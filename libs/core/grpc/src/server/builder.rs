//! gRPC Server utilities.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::task::JoinHandle;
use tonic_health::ServingStatus;
use tonic_health::server::HealthReporter;
use tracing::{info, warn};

use crate::error::{GrpcError, GrpcResult};

/// Helper for creating gRPC servers with health checks.
pub struct GrpcServer;

impl GrpcServer {
    /// Log server startup information.
    ///
    /// Pair with `tonic_health::server::health_reporter()` for the health service.
    pub fn log_startup(addr: &SocketAddr, service_name: &str) {
        info!(
            addr = %addr,
            service = service_name,
            "gRPC server starting"
        );
        info!("Zstd compression enabled");
        info!("Health check service enabled (grpc.health.v1.Health)");
    }

    /// Mark the service and the empty service name as serving
    /// (empty is used by k8s default health checks).
    pub async fn setup_health(health_reporter: &HealthReporter, service_name: &str) {
        Self::set_status(health_reporter, service_name, ServingStatus::Serving).await;
        info!(service = service_name, "Service marked as serving");
    }

    /// Flip both names to not-serving once shutdown begins.
    pub async fn set_not_serving(health_reporter: &HealthReporter, service_name: &str) {
        Self::set_status(health_reporter, service_name, ServingStatus::NotServing).await;
        info!(service = service_name, "Service marked as not serving");
    }

    async fn set_status(
        health_reporter: &HealthReporter,
        service_name: &str,
        status: ServingStatus,
    ) {
        health_reporter
            .set_service_status(service_name, status)
            .await;
        health_reporter.set_service_status("", status).await;
    }
}

/// Wait for a server that has been told to stop, for at most `grace`.
///
/// A server still running after the grace period is aborted and
/// [`GrpcError::DrainTimeout`] is returned.
pub async fn drain(
    mut server: JoinHandle<Result<(), tonic::transport::Error>>,
    grace: Duration,
) -> GrpcResult<()> {
    match tokio::time::timeout(grace, &mut server).await {
        Ok(joined) => {
            joined??;
            info!("gRPC server drained");
            Ok(())
        }
        Err(_) => {
            warn!(grace = ?grace, "In-flight requests did not finish, aborting server");
            server.abort();
            Err(GrpcError::DrainTimeout(grace))
        }
    }
}
