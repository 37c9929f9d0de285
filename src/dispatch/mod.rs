//! Bounded Dispatcher
//!
//! Issues one analyze call per group with at most `max_parallel` calls in
//! flight.
//!
//! ## Flow
//!
//! ```text
//! for each group (key order):
//!     permit  <- semaphore          (waits while max_parallel calls run)
//!     receiver gone? -> abandon the remaining groups
//!     request <- source.build(group)
//!     empty?  -> account, drop permit, next group
//!     spawn task(permit): run_call -> GroupOutcome -> outcome channel
//! join every task                   (returns once all groups are accounted)
//! ```
//!
//! The permit is owned by the call task and released when the task ends, so
//! each call gives it back exactly once whatever its outcome.

mod call;
mod gauge;

pub use call::{run_call, CallOutcome, PartialKind, PartialNotice};
pub use gauge::{InFlightGauge, InFlightGuard};

use crate::error::BatchError;
use crate::grouping::Group;
use crate::request::RequestSource;
use crate::service::AnalysisService;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Terminal outcome of one dispatched group
#[derive(Debug, Clone)]
pub struct GroupOutcome {
    pub group: Group,
    pub outcome: CallOutcome,
    pub elapsed: Duration,
}

/// Accounting of one dispatch run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub groups: usize,
    pub dispatched: usize,
    pub empty: usize,
    pub completed: usize,
    pub failed: usize,
    /// Groups never sent because the outcome receiver went away
    pub abandoned: usize,
    pub peak_in_flight: usize,
}

impl DispatchReport {
    /// Groups that reached a terminal or empty state
    pub fn accounted(&self) -> usize {
        self.empty + self.completed + self.failed + self.abandoned
    }
}

pub struct Dispatcher<S: AnalysisService + ?Sized> {
    service: Arc<S>,
    max_parallel: usize,
    call_timeout: Option<Duration>,
    observer: Option<UnboundedSender<PartialNotice>>,
}

impl<S: AnalysisService + ?Sized> Dispatcher<S> {
    pub fn new(service: Arc<S>, max_parallel: usize) -> Result<Self, BatchError> {
        if max_parallel == 0 {
            return Err(BatchError::InvalidConcurrency);
        }
        Ok(Self {
            service,
            max_parallel,
            call_timeout: None,
            observer: None,
        })
    }

    /// Fail calls that run longer than `timeout`
    pub fn with_call_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Forward partial notifications to `observer`
    pub fn with_observer(mut self, observer: UnboundedSender<PartialNotice>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Dispatch every group and wait until each one is accounted for.
    ///
    /// Outcomes of dispatched groups go to `outcomes` as calls finish, in
    /// completion order. Empty groups produce no outcome. Once the receiver
    /// is dropped no further call is issued.
    pub async fn dispatch<R>(
        &self,
        groups: Vec<Group>,
        source: &R,
        outcomes: UnboundedSender<GroupOutcome>,
    ) -> Result<DispatchReport, BatchError>
    where
        R: RequestSource + ?Sized,
    {
        let semaphore = Arc::new(Semaphore::new(self.max_parallel));
        let gauge = Arc::new(InFlightGauge::default());
        let mut tasks = JoinSet::new();
        let mut report = DispatchReport {
            groups: groups.len(),
            ..Default::default()
        };

        tracing::info!(
            groups = groups.len(),
            max_parallel = self.max_parallel,
            "[Dispatcher] Starting dispatch"
        );

        let total = groups.len();
        for (index, group) in groups.into_iter().enumerate() {
            let permit = Arc::clone(&semaphore)
                .acquire_owned()
                .await
                .map_err(|_| BatchError::Dispatch("permit semaphore closed".to_string()))?;

            if outcomes.is_closed() {
                report.abandoned = total - index;
                tracing::warn!(
                    abandoned = report.abandoned,
                    "[Dispatcher] Outcome receiver closed, not sending remaining groups"
                );
                break;
            }

            tracing::info!(group = %group.key, files = group.files.len(), "[Dispatcher] Processing group");

            let Some(request) = source.build(&group).await else {
                tracing::info!(group = %group.key, "[Dispatcher] No classified images, skipping");
                report.empty += 1;
                drop(permit);
                continue;
            };

            report.dispatched += 1;

            let service = Arc::clone(&self.service);
            let gauge = Arc::clone(&gauge);
            let observer = self.observer.clone();
            let outcomes = outcomes.clone();
            let timeout = self.call_timeout;

            tasks.spawn(async move {
                let _permit = permit;
                let _in_flight = gauge.enter();
                let start = Instant::now();

                let outcome =
                    run_call(&*service, &group.key, request, timeout, observer.as_ref()).await;
                let elapsed = start.elapsed();

                match &outcome {
                    CallOutcome::Completed(Some(_)) => {
                        tracing::info!("[Dispatcher] {} time: {} ms", group.key, elapsed.as_millis());
                    }
                    CallOutcome::Completed(None) => {
                        tracing::warn!(
                            group = %group.key,
                            "[Dispatcher] Stream finished without an event result"
                        );
                    }
                    CallOutcome::Failed(e) => {
                        tracing::error!(
                            group = %group.key,
                            error = %e,
                            elapsed_ms = elapsed.as_millis() as u64,
                            "[Dispatcher] Analyze call failed"
                        );
                    }
                }

                let failed = outcome.is_failed();
                if outcomes
                    .send(GroupOutcome {
                        group,
                        outcome,
                        elapsed,
                    })
                    .is_err()
                {
                    tracing::warn!("[Dispatcher] Outcome receiver dropped");
                }

                failed
            });
        }

        drop(outcomes);

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(false) => report.completed += 1,
                Ok(true) => report.failed += 1,
                Err(e) => {
                    tracing::error!("[Dispatcher] Call task join error: {}", e);
                    report.failed += 1;
                }
            }
        }

        report.peak_in_flight = gauge.peak();

        debug_assert_eq!(report.accounted(), report.groups);
        tracing::info!(
            completed = report.completed,
            failed = report.failed,
            empty = report.empty,
            abandoned = report.abandoned,
            peak_in_flight = report.peak_in_flight,
            "[Dispatcher] All groups accounted"
        );

        Ok(report)
    }
}
