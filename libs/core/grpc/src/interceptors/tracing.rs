use tonic::{Request, Status};

/// Metadata key carrying the correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Interceptor for request correlation
///
/// Injects an `x-request-id` header on outgoing calls so that a frontend
/// request and the shard call it fans out to share one id in the logs.
///
/// # Example
/// ```ignore
/// use grpc_client::interceptors::TracingInterceptor;
/// use rpc::shard::shard_service_client::ShardServiceClient;
///
/// let channel = create_channel_lazy("http://127.0.0.1:3000")?;
/// let client = ShardServiceClient::with_interceptor(channel, TracingInterceptor::new());
/// ```
#[derive(Clone, Debug, Default)]
pub struct TracingInterceptor;

impl TracingInterceptor {
    pub fn new() -> Self {
        Self
    }
}

impl tonic::service::Interceptor for TracingInterceptor {
    fn call(&mut self, mut request: Request<()>) -> Result<Request<()>, Status> {
        // Keep an id set upstream, otherwise start a new one
        let request_id = match request_id(&request) {
            Some(id) => id,
            None => uuid::Uuid::new_v4().to_string(),
        };

        request.metadata_mut().insert(
            REQUEST_ID_HEADER,
            request_id
                .parse()
                .map_err(|_| Status::internal("Failed to create request ID"))?,
        );

        tracing::debug!(
            target: "grpc_client",
            request_id = %request_id,
            "Outgoing gRPC request"
        );

        Ok(request)
    }
}

/// Correlation id of an incoming request, if the caller sent one.
pub fn request_id<T>(request: &Request<T>) -> Option<String> {
    request
        .metadata()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tonic::service::Interceptor;

    #[test]
    fn test_tracing_interceptor_generates_id() {
        let mut tracing = TracingInterceptor::new();
        let req = tracing.call(Request::new(())).unwrap();

        let id = request_id(&req).expect("request id should be set");
        assert!(uuid::Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_tracing_interceptor_keeps_existing_id() {
        let mut tracing = TracingInterceptor::new();
        let mut request = Request::new(());
        request
            .metadata_mut()
            .insert(REQUEST_ID_HEADER, "abc-123".parse().unwrap());

        let req = tracing.call(request).unwrap();
        assert_eq!(request_id(&req).as_deref(), Some("abc-123"));
    }
}
