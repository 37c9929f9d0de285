//! gRPC client for the Tolling Vision service

use super::{AnalysisService, ResponseStream};
use crate::config::BatchConfig;
use crate::error::{BatchError, ServiceError};
use crate::proto::{EventRequest, EventResponse, ANALYZE_PATH};
use async_trait::async_trait;
use futures::StreamExt;
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};

/// Turn a bare `host:port` into a URI, picking the scheme from `secured`
pub fn service_uri(address: &str, secured: bool) -> String {
    if address.contains("://") {
        return address.to_string();
    }
    let scheme = if secured { "https" } else { "http" };
    format!("{}://{}", scheme, address)
}

/// Analysis client over one lazily connected channel
#[derive(Debug, Clone)]
pub struct GrpcAnalysisClient {
    inner: Grpc<Channel>,
}

impl GrpcAnalysisClient {
    /// Build the channel without connecting. Connection errors surface on
    /// the first call of each group.
    pub fn connect_lazy(config: &BatchConfig) -> Result<Self, BatchError> {
        let uri = service_uri(&config.service_address, config.secured);

        let mut endpoint =
            Endpoint::from_shared(uri.clone()).map_err(|e| BatchError::InvalidAddress {
                address: config.service_address.clone(),
                reason: e.to_string(),
            })?;

        if config.secured {
            endpoint = endpoint.tls_config(ClientTlsConfig::new().with_native_roots())?;
        }

        if let Some(timeout) = config.connect_timeout {
            endpoint = endpoint.connect_timeout(timeout);
        }

        tracing::info!(uri = %uri, secured = config.secured, "[Client] Channel configured");

        Ok(Self {
            inner: Grpc::new(endpoint.connect_lazy()),
        })
    }
}

#[async_trait]
impl AnalysisService for GrpcAnalysisClient {
    async fn analyze(&self, request: EventRequest) -> Result<ResponseStream, ServiceError> {
        let mut grpc = self.inner.clone();

        grpc.ready().await.map_err(|e| ServiceError::Rpc {
            code: tonic::Code::Unavailable,
            message: format!("Service was not ready: {}", e),
        })?;

        let codec: ProstCodec<EventRequest, EventResponse> = ProstCodec::default();
        let path = PathAndQuery::from_static(ANALYZE_PATH);
        let response = grpc
            .server_streaming(tonic::Request::new(request), path, codec)
            .await?;

        Ok(response
            .into_inner()
            .map(|item| item.map_err(ServiceError::from))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_uri_adds_scheme() {
        assert_eq!(service_uri("vision.local:443", true), "https://vision.local:443");
        assert_eq!(service_uri("127.0.0.1:50051", false), "http://127.0.0.1:50051");
        assert_eq!(service_uri("http://already:1", true), "http://already:1");
    }
}
