/// Re-export tonic's Interceptor trait for convenience
pub use tonic::service::Interceptor;

pub mod tracing;

pub use tracing::{REQUEST_ID_HEADER, TracingInterceptor, request_id};
