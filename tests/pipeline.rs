use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tolling_vision_batch::config::BatchConfig;
use tolling_vision_batch::dispatch::PartialKind;
use tolling_vision_batch::error::{BatchError, ServiceError};
use tolling_vision_batch::output::CSV_HEADER;
use tolling_vision_batch::pipeline::{run_batch, run_batch_observed};
use tolling_vision_batch::proto::{
    partial_result, ErrorResponse, EventRequest, EventResponse, EventResult, PartialResult,
};
use tolling_vision_batch::service::{AnalysisService, ResponseStream};

/// Deterministic service: node is `N` followed by the image count per role
#[derive(Default)]
struct CountingService {
    calls: AtomicUsize,
    requests: Mutex<Vec<EventRequest>>,
}

#[async_trait]
impl AnalysisService for CountingService {
    async fn analyze(&self, request: EventRequest) -> Result<ResponseStream, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let node = if request.front_image.len() == 1 && request.rear_image.len() == 1 {
            "N1".to_string()
        } else {
            format!(
                "N{}-{}-{}",
                request.front_image.len(),
                request.rear_image.len(),
                request.overview_image.len()
            )
        };
        self.requests.lock().unwrap().push(request);

        let items = vec![
            Ok(EventResponse::partial(PartialResult {
                result_index: 0,
                outcome: Some(partial_result::Outcome::Error(ErrorResponse {
                    code: 1,
                    message: "low light".to_string(),
                })),
            })),
            Ok(EventResponse::event_result(EventResult {
                node,
                ..Default::default()
            })),
        ];
        Ok(stream::iter(items).boxed())
    }
}

fn write_image(root: &Path, relative: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, relative.as_bytes()).unwrap();
}

fn config(root: &Path, output: &Path, max_parallel: usize) -> BatchConfig {
    BatchConfig {
        service_address: "127.0.0.1:9".to_string(),
        secured: false,
        max_parallel,
        image_root: root.to_path_buf(),
        output_path: output.to_path_buf(),
        group_pattern: r"crossing\d+".to_string(),
        front_pattern: "front".to_string(),
        rear_pattern: "rear".to_string(),
        overview_pattern: "overview".to_string(),
        call_timeout: None,
        connect_timeout: None,
    }
}

fn data_rows(csv: &Path) -> Vec<String> {
    let text = fs::read_to_string(csv).unwrap();
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some(CSV_HEADER));
    let mut rows: Vec<String> = lines.map(str::to_string).collect();
    rows.sort();
    rows
}

#[tokio::test]
async fn single_crossing_produces_one_row() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("images");
    write_image(&images, "crossing1_front.jpg");
    write_image(&images, "crossing1_rear.jpg");
    let csv = tmp.path().join("out.csv");

    let service = Arc::new(CountingService::default());
    let summary = run_batch(&config(&images, &csv, 1), Arc::clone(&service))
        .await
        .unwrap();

    assert_eq!(service.calls.load(Ordering::SeqCst), 1);
    let requests = service.requests.lock().unwrap();
    assert_eq!(requests[0].front_image.len(), 1);
    assert_eq!(requests[0].rear_image.len(), 1);
    assert!(requests[0].overview_image.is_empty());

    assert_eq!(summary.images, 2);
    assert_eq!(summary.dispatch.groups, 1);
    assert_eq!(summary.rows_written, 1);
    assert_eq!(data_rows(&csv), vec!["crossing1_front.jpg,crossing1_rear.jpg,,N1,,,,,,"]);
}

#[tokio::test]
async fn lone_unmatched_file_is_ungrouped_and_not_dispatched() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("images");
    write_image(&images, "misc/parking_lot.png");
    let csv = tmp.path().join("out.csv");

    let service = Arc::new(CountingService::default());
    let summary = run_batch(&config(&images, &csv, 2), Arc::clone(&service))
        .await
        .unwrap();

    assert_eq!(service.calls.load(Ordering::SeqCst), 0);
    assert_eq!(summary.dispatch.groups, 1);
    assert_eq!(summary.dispatch.empty, 1);
    assert_eq!(summary.rows_written, 0);
    assert!(data_rows(&csv).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn many_crossings_are_written_once_each() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("images");
    for i in 0..6 {
        write_image(&images, &format!("day{}/crossing{i}_front.jpg", i % 2));
        write_image(&images, &format!("day{}/crossing{i}_overview.bmp", i % 2));
    }
    write_image(&images, "notes/crossing9_readme.txt");
    let csv = tmp.path().join("out.csv");

    let service = Arc::new(CountingService::default());
    let (notice_tx, mut notice_rx) = tokio::sync::mpsc::unbounded_channel();
    let summary = run_batch_observed(&config(&images, &csv, 3), Arc::clone(&service), Some(notice_tx))
        .await
        .unwrap();

    assert_eq!(summary.dispatch.dispatched, 6);
    assert!(summary.dispatch.peak_in_flight <= 3);
    let rows = data_rows(&csv);
    assert_eq!(rows.len(), 6);
    assert_eq!(rows[0], "crossing0_front.jpg,,crossing0_overview.bmp,N1-0-1,,,,,,");

    let mut partial_errors = 0;
    while let Some(notice) = notice_rx.recv().await {
        assert!(matches!(notice.kind, PartialKind::Error(_)));
        assert_eq!(notice.total, 2);
        partial_errors += 1;
    }
    assert_eq!(partial_errors, 6);
}

#[tokio::test]
async fn rerun_produces_identical_rows() {
    let tmp = TempDir::new().unwrap();
    let images = tmp.path().join("images");
    write_image(&images, "crossing1_front.jpg");
    write_image(&images, "crossing1_rear.jpg");
    write_image(&images, "crossing2_rear.jpg");
    write_image(&images, "crossing2_overview_front.jpg");

    let first = tmp.path().join("first.csv");
    let second = tmp.path().join("second.csv");
    let service = Arc::new(CountingService::default());
    run_batch(&config(&images, &first, 2), Arc::clone(&service)).await.unwrap();
    run_batch(&config(&images, &second, 2), Arc::clone(&service)).await.unwrap();

    assert_eq!(data_rows(&first), data_rows(&second));
    assert_eq!(data_rows(&first).len(), 2);
}

#[tokio::test]
async fn invalid_pattern_fails_before_output_is_created() {
    let tmp = TempDir::new().unwrap();
    let csv = tmp.path().join("out.csv");
    let mut config = config(tmp.path(), &csv, 1);
    config.front_pattern = "front(".to_string();

    let err = run_batch(&config, Arc::new(CountingService::default()))
        .await
        .unwrap_err();

    assert!(matches!(err, BatchError::InvalidPattern { role: "front", .. }));
    assert!(!csv.exists());
}
