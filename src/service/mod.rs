//! Analysis Service
//!
//! The remote recognition pipeline is a black box behind [`AnalysisService`]:
//! one request in, a stream of partial notifications and one event result
//! out. The production implementation talks gRPC; tests script their own.

mod grpc;

use crate::error::ServiceError;
use crate::proto::{EventRequest, EventResponse};
use async_trait::async_trait;
use futures::stream::BoxStream;

pub use grpc::{service_uri, GrpcAnalysisClient};

/// Server stream of one analyze call
pub type ResponseStream = BoxStream<'static, Result<EventResponse, ServiceError>>;

#[async_trait]
pub trait AnalysisService: Send + Sync + 'static {
    /// Open one server-streaming analyze call
    async fn analyze(&self, request: EventRequest) -> Result<ResponseStream, ServiceError>;
}
