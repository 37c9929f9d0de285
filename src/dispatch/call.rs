//! One analyze call
//!
//! Drives a single server stream to its terminal outcome. Partial
//! notifications are logged and forwarded to the observer; they never end
//! the call.

use crate::error::ServiceError;
use crate::proto::event_response::Payload;
use crate::proto::partial_result::Outcome;
use crate::proto::{ErrorResponse, EventRequest, EventResult, PartialResult};
use crate::service::AnalysisService;
use futures::StreamExt;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Terminal outcome of one call
#[derive(Debug, Clone)]
pub enum CallOutcome {
    /// Stream finished. `None` when the service closed it without an event result.
    Completed(Option<EventResult>),
    Failed(ServiceError),
}

impl CallOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, CallOutcome::Failed(_))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartialKind {
    Error(ErrorResponse),
    /// One image finished recognition
    Recognized,
}

/// Intermediate signal of a running call
#[derive(Debug, Clone, PartialEq)]
pub struct PartialNotice {
    pub group: String,
    /// 1-based position of the image the notice refers to
    pub position: u32,
    /// Images carried by the request
    pub total: usize,
    pub kind: PartialKind,
}

/// Run one call, optionally bounded by `timeout`
pub async fn run_call<S>(
    service: &S,
    group: &str,
    request: EventRequest,
    timeout: Option<Duration>,
    observer: Option<&UnboundedSender<PartialNotice>>,
) -> CallOutcome
where
    S: AnalysisService + ?Sized,
{
    let call = consume_call(service, group, request, observer);
    match timeout {
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or_else(|_| CallOutcome::Failed(ServiceError::Timeout(limit))),
        None => call.await,
    }
}

async fn consume_call<S>(
    service: &S,
    group: &str,
    request: EventRequest,
    observer: Option<&UnboundedSender<PartialNotice>>,
) -> CallOutcome
where
    S: AnalysisService + ?Sized,
{
    let total = request.image_count();

    let mut stream = match service.analyze(request).await {
        Ok(stream) => stream,
        Err(e) => return CallOutcome::Failed(e),
    };

    let mut result: Option<EventResult> = None;

    while let Some(item) = stream.next().await {
        match item {
            Ok(response) => match response.payload {
                Some(Payload::EventResult(event)) => {
                    if result.is_some() {
                        tracing::warn!(group, "[Call] Ignoring extra event result");
                    } else {
                        result = Some(event);
                    }
                }
                Some(Payload::PartialResult(partial)) => {
                    observe_partial(group, total, partial, observer);
                }
                None => tracing::debug!(group, "[Call] Empty response message"),
            },
            Err(e) => {
                if let Some(event) = result {
                    tracing::warn!(group, error = %e, "[Call] Stream failed after event result");
                    return CallOutcome::Completed(Some(event));
                }
                return CallOutcome::Failed(e);
            }
        }
    }

    CallOutcome::Completed(result)
}

fn observe_partial(
    group: &str,
    total: usize,
    partial: PartialResult,
    observer: Option<&UnboundedSender<PartialNotice>>,
) {
    let position = partial.result_index.saturating_add(1);

    let kind = match partial.outcome {
        Some(Outcome::Error(error)) => {
            tracing::warn!(
                "[Call] {} {}/{}. Partial result (Error): code={} {}",
                group,
                position,
                total,
                error.code,
                error.message
            );
            PartialKind::Error(error)
        }
        Some(Outcome::Result(search)) if search.is_result() => {
            tracing::debug!("[Call] {} {}/{}. Partial result recognized", group, position, total);
            PartialKind::Recognized
        }
        _ => return,
    };

    if let Some(observer) = observer {
        let _ = observer.send(PartialNotice {
            group: group.to_string(),
            position,
            total,
            kind,
        });
    }
}
