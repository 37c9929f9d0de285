//! Batch pipeline
//!
//! ```text
//! scan -> group -> (roles + request per group) -> dispatch -> writer -> CSV
//! ```

use crate::config::BatchConfig;
use crate::dispatch::{DispatchReport, Dispatcher, PartialNotice};
use crate::error::BatchError;
use crate::grouping::{GroupMap, GroupPattern, RolePatterns};
use crate::output::{spawn_outcome_writer, CsvSink};
use crate::request::RequestBuilder;
use crate::scan::ImageScanner;
use crate::service::AnalysisService;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Totals of one run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub images: usize,
    pub dispatch: DispatchReport,
    pub rows_written: usize,
    pub elapsed: Duration,
}

/// Run the whole batch against `service`
pub async fn run_batch<S>(config: &BatchConfig, service: Arc<S>) -> Result<RunSummary, BatchError>
where
    S: AnalysisService + ?Sized,
{
    run_batch_observed(config, service, None).await
}

/// [`run_batch`] with partial notifications forwarded to `observer`
pub async fn run_batch_observed<S>(
    config: &BatchConfig,
    service: Arc<S>,
    observer: Option<mpsc::UnboundedSender<PartialNotice>>,
) -> Result<RunSummary, BatchError>
where
    S: AnalysisService + ?Sized,
{
    let start = Instant::now();

    let group_pattern = GroupPattern::new(&config.group_pattern)?;
    let role_patterns = RolePatterns::new(
        &config.front_pattern,
        &config.rear_pattern,
        &config.overview_pattern,
    )?;

    let mut dispatcher =
        Dispatcher::new(service, config.max_parallel)?.with_call_timeout(config.call_timeout);
    if let Some(observer) = observer {
        dispatcher = dispatcher.with_observer(observer);
    }

    let scanner = ImageScanner::new(&config.image_root);
    let groups = GroupMap::partition(scanner.scan(), &group_pattern);
    let images = groups.file_count();
    if groups.is_empty() {
        tracing::warn!(root = %config.image_root.display(), "[Pipeline] No images found");
    }

    tracing::info!(
        root = %config.image_root.display(),
        images,
        "[Pipeline] Total analyze service calls: {}",
        groups.len()
    );

    let sink = CsvSink::create(&config.output_path).await?;
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
    let writer = spawn_outcome_writer(sink, role_patterns.clone(), outcome_rx);

    let requests = RequestBuilder::new(role_patterns);
    let dispatch = dispatcher
        .dispatch(groups.into_groups(), &requests, outcome_tx)
        .await?;

    let written = writer
        .await
        .map_err(|e| BatchError::Writer(e.to_string()))?
        .map_err(|source| BatchError::Output {
            path: config.output_path.clone(),
            source,
        })?;

    let summary = RunSummary {
        images,
        dispatch,
        rows_written: written.rows,
        elapsed: start.elapsed(),
    };

    tracing::info!(
        rows = summary.rows_written,
        "[Pipeline] Total time: {} ms",
        summary.elapsed.as_millis()
    );

    Ok(summary)
}
